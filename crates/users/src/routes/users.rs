//! `/usuarios` handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use registry_core::{Email, Envelope, UserId};

use super::parse_id;
use crate::error::{AppError, Result};
use crate::models::{NewUser, User, UserPatch};
use crate::state::AppState;

const USER_NOT_FOUND: &str = "Usuario no encontrado";

/// Body of `POST /usuarios`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub edad: Option<i32>,
}

impl CreateUserRequest {
    fn into_new_user(self) -> Result<NewUser> {
        let name = self.nombre.filter(|n| !n.trim().is_empty());
        let email = self.email.filter(|e| !e.trim().is_empty());
        let (Some(name), Some(email)) = (name, email) else {
            return Err(AppError::BadRequest(
                "Nombre y email son requeridos".to_string(),
            ));
        };

        Ok(NewUser {
            name,
            email: parse_email(&email)?,
            phone: self.telefono,
            age: self.edad,
        })
    }
}

/// Body of `PUT /usuarios/{id}`. `telefono` and `edad` accept `null` to clear.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "registry_core::patch::present")]
    pub telefono: Option<Option<String>>,
    #[serde(default, deserialize_with = "registry_core::patch::present")]
    pub edad: Option<Option<i32>>,
}

impl UpdateUserRequest {
    fn into_patch(self) -> Result<UserPatch> {
        Ok(UserPatch {
            name: self.nombre,
            email: self.email.as_deref().map(parse_email).transpose()?,
            phone: self.telefono,
            age: self.edad,
        })
    }
}

fn parse_email(raw: &str) -> Result<Email> {
    Email::parse(raw).map_err(|e| AppError::BadRequest(format!("Email inválido: {e}")))
}

/// `GET /usuarios`
pub async fn index(State(state): State<AppState>) -> Result<Json<Envelope<Vec<User>>>> {
    let users = state.store().list().await?;
    Ok(Json(Envelope::list(users)))
}

/// `GET /usuarios/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<User>>> {
    let id: UserId = parse_id(&id, USER_NOT_FOUND)?;
    let user = state.store().get(id).await?;
    Ok(Json(Envelope::ok(user)))
}

/// `POST /usuarios`
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<User>>)> {
    let Json(body) = payload?;
    let user = state.store().create(body.into_new_user()?).await?;

    tracing::info!(user_id = %user.id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(user).with_message("Usuario creado exitosamente")),
    ))
}

/// `PUT /usuarios/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<Envelope<User>>> {
    let id: UserId = parse_id(&id, USER_NOT_FOUND)?;
    let Json(body) = payload?;
    let user = state.store().update(id, body.into_patch()?).await?;

    Ok(Json(
        Envelope::ok(user).with_message("Usuario actualizado exitosamente"),
    ))
}

/// `DELETE /usuarios/{id}`
///
/// Orders referencing the user are left in place.
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<User>>> {
    let id: UserId = parse_id(&id, USER_NOT_FOUND)?;
    let user = state.store().delete(id).await?;

    tracing::info!(user_id = %user.id, "User deleted");

    Ok(Json(
        Envelope::ok(user).with_message("Usuario eliminado exitosamente"),
    ))
}

/// `GET /usuarios/buscar/{termino}`
pub async fn search(
    State(state): State<AppState>,
    Path(termino): Path<String>,
) -> Result<Json<Envelope<Vec<User>>>> {
    let users = state.store().search(&termino).await?;
    Ok(Json(
        Envelope::list(users).with_meta("termino_busqueda", termino),
    ))
}
