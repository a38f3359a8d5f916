// src/services/user_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{error::AppError, security::PasswordHasher},
    db::{RoleRepository, UserRepository},
    models::{
        role::{Role, RoleName},
        user::{NewUser, User, UserFilter},
    },
    services::policy,
};

/// Campos opcionais de uma atualização de usuário.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        hasher: PasswordHasher,
    ) -> Self {
        Self { users, roles, hasher }
    }

    async fn load_actor(&self, actor_id: Uuid) -> Result<User, AppError> {
        let actor = self
            .users
            .find_by_id(actor_id)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !actor.is_admin() {
            return Err(AppError::Forbidden("apenas administradores".into()));
        }
        Ok(actor)
    }

    async fn load_role(&self, name: &str) -> Result<Role, AppError> {
        self.roles
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::RoleNotFound(name.to_string()))
    }

    async fn load_target(&self, actor: &User, id: Uuid, action: &str) -> Result<User, AppError> {
        let target = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        policy::ensure_can_act_on(actor, &target, action)?;
        Ok(target)
    }

    /// Cria professor ou aluno na escola do administrador que chama.
    pub async fn create_teacher_or_student(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: &str,
        actor_id: Uuid,
    ) -> Result<User, AppError> {
        let role = self.load_role(role).await?;
        if !matches!(
            RoleName::parse(&role.name),
            Some(RoleName::Teacher | RoleName::Student)
        ) {
            return Err(AppError::InvalidRole(role.name));
        }

        if self.users.find_by_email(email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        let actor = self.load_actor(actor_id).await?;
        let password_hash = self.hasher.hash(password).await?;

        let user = self
            .users
            .create(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                whatsapp_number: None,
                position: None,
                role_id: role.id,
                role_name: role.name,
                school_id: actor.school_id,
                created_by: Some(actor.id),
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role_name, "👤 Usuário criado");
        Ok(user)
    }

    pub async fn get_all_users(&self, role: Option<&str>, actor_id: Uuid) -> Result<Vec<User>, AppError> {
        let actor = self.load_actor(actor_id).await?;

        let role_id = match role {
            Some(name) => Some(self.load_role(name).await?.id),
            None => None,
        };

        self.users
            .find_all(UserFilter {
                role_id,
                school_id: policy::listing_scope(&actor),
            })
            .await
    }

    pub async fn get_user_by_id(&self, id: Uuid, actor_id: Uuid) -> Result<User, AppError> {
        let actor = self.load_actor(actor_id).await?;
        self.load_target(&actor, id, "ver").await
    }

    pub async fn update_user(
        &self,
        id: Uuid,
        actor_id: Uuid,
        changes: UserChanges,
    ) -> Result<User, AppError> {
        let actor = self.load_actor(actor_id).await?;
        let mut user = self.load_target(&actor, id, "atualizar").await?;

        if let Some(name) = changes.name {
            user.name = name;
        }

        if let Some(email) = changes.email {
            if email != user.email {
                if self.users.find_by_email(&email).await?.is_some() {
                    return Err(AppError::EmailAlreadyExists);
                }
                user.email = email;
            }
        }

        if let Some(role) = changes.role {
            let role = self.load_role(&role).await?;
            user.role_id = role.id;
            user.role_name = role.name;
        }

        user.updated_by = Some(actor.id);
        self.users.update(&user).await
    }

    pub async fn delete_user(&self, id: Uuid, actor_id: Uuid) -> Result<(), AppError> {
        let actor = self.load_actor(actor_id).await?;
        let target = self.load_target(&actor, id, "excluir").await?;

        if target.id == actor.id {
            return Err(AppError::Forbidden("administrador não pode excluir a si mesmo".into()));
        }

        if !self.users.delete(target.id).await? {
            return Err(AppError::UserNotFound);
        }

        tracing::info!(user_id = %target.id, deleted_by = %actor.id, "🗑️ Usuário excluído");
        Ok(())
    }
}
