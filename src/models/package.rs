// src/models/package.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Nome do pacote padrão. Toda escola nasce nele.
pub const FREE_TRIAL: &str = "Free Trial";

// ---
// Package (O "Plano de Assinatura")
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "Free Trial")]
    pub name: String,

    // Preço por aluno e preço anual são mutuamente exclusivos.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_student: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_year: Option<Decimal>,

    #[schema(example = 30)]
    pub duration_days: Option<i32>,

    // None = sem limite (ex.: Enterprise)
    #[schema(example = 50)]
    pub max_students: Option<i32>,

    pub features: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Formato de cobrança derivado das colunas de preço.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingShape {
    PerStudent(Decimal),
    PerYear(Decimal),
    Free,
}

impl Package {
    pub fn is_free_trial(&self) -> bool {
        self.name == FREE_TRIAL
    }

    pub fn pricing(&self) -> PricingShape {
        match (self.price_per_student, self.price_per_year) {
            (Some(price), _) => PricingShape::PerStudent(price),
            (None, Some(price)) => PricingShape::PerYear(price),
            (None, None) => PricingShape::Free,
        }
    }

    /// Limite copiado para `School.max_students_allowed`. 0 quando o pacote é ilimitado.
    pub fn student_cap(&self) -> i32 {
        self.max_students.unwrap_or(0)
    }
}

// Dados para inserir um pacote (usado só pelo seed)
#[derive(Debug, Clone)]
pub struct NewPackage {
    pub name: String,
    pub pricing: PricingShape,
    pub duration_days: Option<i32>,
    pub max_students: Option<i32>,
    pub features: Vec<String>,
}

impl NewPackage {
    pub fn price_per_student(&self) -> Option<Decimal> {
        match self.pricing {
            PricingShape::PerStudent(price) => Some(price),
            _ => None,
        }
    }

    pub fn price_per_year(&self) -> Option<Decimal> {
        match self.pricing {
            PricingShape::PerYear(price) => Some(price),
            _ => None,
        }
    }
}
