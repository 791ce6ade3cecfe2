// src/web/proprietario_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{Proprietario, ProprietarioEntrada},
    state::AppState,
    store::agora_iso,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

fn nao_encontrado() -> AppError {
    AppError::NaoEncontrado("Proprietário não encontrado".into())
}

// GET /api/proprietarios
pub async fn listar(State(state): State<AppState>) -> Json<Vec<Proprietario>> {
    Json(state.store.listar::<Proprietario>().await)
}

// GET /api/proprietarios/{id}
pub async fn buscar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Proprietario>> {
    let proprietario =
        state.store.buscar::<Proprietario>(id).await?.ok_or_else(nao_encontrado)?;
    Ok(Json(proprietario))
}

// POST /api/proprietarios
pub async fn criar(
    State(state): State<AppState>,
    Json(entrada): Json<ProprietarioEntrada>,
) -> AppResult<impl IntoResponse> {
    let faltando = entrada.faltando();
    if !faltando.is_empty() {
        return Err(AppError::Validacao(format!(
            "Campos obrigatórios faltando: {}",
            faltando.join(", ")
        )));
    }

    let mut proprietario = Proprietario { criado_em: agora_iso(), ..Proprietario::default() };
    entrada.aplicar(&mut proprietario);

    state.store.gravar(&mut proprietario)?.aguardar_arquivo().await?;
    state
        .realtime
        .transmitir("proprietario-criado", serde_json::to_value(&proprietario)?)
        .await;
    tracing::info!("✅ Proprietário criado: {} (id {})", proprietario.nome, proprietario.id);

    Ok((StatusCode::CREATED, Json(proprietario)))
}

// PUT /api/proprietarios/{id}
pub async fn atualizar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(entrada): Json<ProprietarioEntrada>,
) -> AppResult<Json<Proprietario>> {
    let mut proprietario =
        state.store.buscar::<Proprietario>(id).await?.ok_or_else(nao_encontrado)?;

    entrada.aplicar(&mut proprietario);
    proprietario.atualizado_em = Some(agora_iso());

    state.store.gravar(&mut proprietario)?.aguardar_arquivo().await?;
    state
        .realtime
        .transmitir("proprietario-atualizado", serde_json::to_value(&proprietario)?)
        .await;
    Ok(Json(proprietario))
}

// DELETE /api/proprietarios/{id}
pub async fn excluir(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let proprietario =
        state.store.buscar::<Proprietario>(id).await?.ok_or_else(nao_encontrado)?;

    state.store.remover::<Proprietario>(id).aguardar_arquivo().await?;
    state.realtime.transmitir("proprietario-excluido", json!({ "id": id })).await;

    Ok(Json(json!({
        "success": true,
        "message": "Proprietário excluído com sucesso",
        "proprietario": proprietario,
    })))
}
