// src/models/school.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ENUMS ---

// Mapeia o CREATE TYPE education_level do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "education_level")]
pub enum EducationLevel {
    SD,
    SMP,
    SMA,
    SMK,
    PerguruanTinggi,
    Lainnya,
}

// Mapeia o CREATE TYPE school_status do banco (pública / privada)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "school_status")]
pub enum SchoolStatus {
    Negeri,
    Swasta,
}

// ---
// School (O "Tenant")
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct School {
    #[schema(example = "a1b2c3d4-e5f6-7890-1234-567890abcdef")]
    pub id: Uuid,

    #[schema(example = "Barniee Academy")]
    pub name: String,

    pub education_level: EducationLevel,
    pub status: SchoolStatus,

    #[schema(example = "Jl. Inovasi No. 10, Kota Teknologi")]
    pub address: String,

    #[schema(example = 150)]
    pub initial_student_count: i32,

    // Vazio até o passo 2 do cadastro
    pub admin_user_id: Option<Uuid>,

    pub package_id: Uuid,

    // Janela de assinatura: só existe para o Free Trial
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_end_date: Option<DateTime<Utc>>,

    // Cópia do limite do pacote no momento da seleção (0 = ilimitado)
    pub max_students_allowed: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl School {
    pub fn has_subscription_window(&self) -> bool {
        self.subscription_start_date.is_some()
    }
}

// Dados para inserir uma escola (passo 1)
#[derive(Debug, Clone)]
pub struct NewSchool {
    pub name: String,
    pub education_level: EducationLevel,
    pub status: SchoolStatus,
    pub address: String,
    pub initial_student_count: i32,
    pub package_id: Uuid,
    pub max_students_allowed: i32,
}
