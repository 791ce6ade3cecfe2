// src/web/mw_auth.rs
use crate::{models::UsuarioPublico, services::auth_service, state::AppState};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

/// Identidade de quem chamou, posta nas extensões da requisição.
/// `None` quando não veio token ou a sessão não vale mais.
#[derive(Clone, Debug)]
pub struct Requisitante(pub Option<UsuarioPublico>);

/// Identifica o chamador pelo `Authorization: Bearer <token>` e segue em
/// frente. Nunca bloqueia: rotas abertas atendem anônimos e as guardas
/// de administração decidem nos handlers.
pub async fn identificar(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|valor| valor.to_str().ok())
        .and_then(|valor| valor.strip_prefix("Bearer "))
        .map(str::to_string);

    let usuario = match token {
        Some(token) => auth_service::verificar_sessao(&state.store, &token).await.ok(),
        None => None,
    };
    if let Some(usuario) = &usuario {
        tracing::debug!("Requisição autenticada como {}", usuario.email);
    }

    request.extensions_mut().insert(Requisitante(usuario));
    next.run(request).await
}
