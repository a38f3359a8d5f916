// src/services/policy.rs
//
// Regra de fronteira de escola, compartilhada por todos os serviços.

use uuid::Uuid;

use crate::{common::error::AppError, models::user::User};

/// Master admin (admin sem escola) age sobre qualquer usuário.
/// Admin de escola só age sobre usuários da própria escola.
/// Quem não é admin não age sobre ninguém.
pub fn can_act_on(actor: &User, target_school_id: Option<Uuid>) -> bool {
    if !actor.is_admin() {
        return false;
    }
    match actor.school_id {
        None => true,
        Some(actor_school) => target_school_id == Some(actor_school),
    }
}

pub fn ensure_can_act_on(actor: &User, target: &User, action: &str) -> Result<(), AppError> {
    if can_act_on(actor, target.school_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "admin de escola não pode {action} usuários fora da sua escola"
        )))
    }
}

/// Escola usada como filtro nas listagens. None = sem filtro (master admin).
pub fn listing_scope(actor: &User) -> Option<Uuid> {
    if actor.is_master_admin() { None } else { actor.school_id }
}
