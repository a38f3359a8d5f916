// src/services/subscription.rs
//
// Cálculo da janela de assinatura e do limite de alunos de uma escola.

use chrono::{DateTime, Duration, Utc};

use crate::models::{package::Package, school::School};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Só o Free Trial com duração definida tem janela. Pacotes pagos não têm.
pub fn trial_window(package: &Package, now: DateTime<Utc>) -> Option<SubscriptionWindow> {
    if !package.is_free_trial() {
        return None;
    }
    let days = package.duration_days?;
    Some(SubscriptionWindow {
        start: now,
        end: now + Duration::days(i64::from(days)),
    })
}

/// Passo 3: troca o pacote, recalcula o limite e sobrescreve a janela.
pub fn apply_package(school: &mut School, package: &Package, now: DateTime<Utc>) {
    school.package_id = package.id;
    school.max_students_allowed = package.student_cap();

    let window = trial_window(package, now);
    school.subscription_start_date = window.map(|w| w.start);
    school.subscription_end_date = window.map(|w| w.end);
}

/// Salvaguarda da conclusão: Free Trial sem janela ganha uma agora.
/// Retorna `true` se a escola mudou.
pub fn ensure_trial_window(school: &mut School, package: &Package, now: DateTime<Utc>) -> bool {
    if school.has_subscription_window() {
        return false;
    }
    match trial_window(package, now) {
        Some(window) => {
            school.subscription_start_date = Some(window.start);
            school.subscription_end_date = Some(window.end);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{package_fixture, school_fixture};
    use crate::models::package::FREE_TRIAL;

    #[test]
    fn free_trial_window_spans_duration() {
        let trial = package_fixture(FREE_TRIAL, Some(30), Some(50));
        let now = Utc::now();

        let window = trial_window(&trial, now).unwrap();
        assert_eq!(window.start, now);
        assert_eq!(window.end - window.start, Duration::days(30));
    }

    #[test]
    fn trial_without_duration_or_paid_package_has_no_window() {
        let now = Utc::now();
        assert!(trial_window(&package_fixture(FREE_TRIAL, None, Some(50)), now).is_none());
        assert!(trial_window(&package_fixture("Premium", Some(365), None), now).is_none());
    }

    #[test]
    fn selecting_paid_package_clears_window_and_cap() {
        let trial = package_fixture(FREE_TRIAL, Some(30), Some(50));
        let enterprise = package_fixture("Enterprise", None, None);
        let mut school = school_fixture(trial.id, 50);
        let now = Utc::now();

        apply_package(&mut school, &trial, now);
        assert!(school.has_subscription_window());

        apply_package(&mut school, &enterprise, now);
        assert_eq!(school.package_id, enterprise.id);
        assert_eq!(school.max_students_allowed, 0);
        assert_eq!(school.subscription_start_date, None);
        assert_eq!(school.subscription_end_date, None);
    }

    #[test]
    fn safeguard_only_fills_missing_trial_window() {
        let trial = package_fixture(FREE_TRIAL, Some(30), Some(50));
        let mut school = school_fixture(trial.id, 50);
        let now = Utc::now();

        assert!(ensure_trial_window(&mut school, &trial, now));
        let first_start = school.subscription_start_date;

        assert!(!ensure_trial_window(&mut school, &trial, now + Duration::days(1)));
        assert_eq!(school.subscription_start_date, first_start);

        let premium = package_fixture("Premium", None, None);
        let mut paid = school_fixture(premium.id, 0);
        assert!(!ensure_trial_window(&mut paid, &premium, now));
    }
}
