// src/common/security.rs
//
// Primitivas de credenciais: hashing de senha, OTP e senha gerada.

use bcrypt::{hash, verify};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};

use crate::common::error::AppError;

pub const OTP_LENGTH: usize = 6;
pub const GENERATED_PASSWORD_LENGTH: usize = 12;

/// Hash/verify de senhas com bcrypt.
///
/// O bcrypt é CPU-bound, então roda em `spawn_blocking` para não travar o runtime.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password_clone = password.to_owned();
        let cost = self.cost;

        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        Ok(hashed)
    }

    pub async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        let password_clone = password.to_owned();
        let password_hash_clone = password_hash.to_owned();

        // Executa a verificação em um thread separado
        let is_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        Ok(is_valid)
    }
}

/// Código numérico de 6 dígitos, com zeros à esquerda, tirado do CSPRNG do SO.
pub fn generate_otp() -> String {
    let code: u32 = OsRng.gen_range(0..1_000_000);
    format!("{:0width$}", code, width = OTP_LENGTH)
}

/// Senha alfanumérica para o administrador criado no cadastro.
pub fn generate_random_password(length: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
