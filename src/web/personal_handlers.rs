// src/web/personal_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{Academia, Personal, PersonalEntrada, Status},
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
    AppError::NaoEncontrado("Personal não encontrado".into())
}

fn nome_da_academia(personal: &Personal, academias: &[Academia]) -> String {
    personal
        .academia_id
        .and_then(|id| academias.iter().find(|a| a.id == id))
        .map(|a| a.nome.clone())
        .unwrap_or_else(|| "Independente".to_string())
}

async fn listar_com_academia(state: &AppState, apenas_ativos: bool) -> AppResult<Vec<Value>> {
    let personais = state.store.listar::<Personal>().await;
    let academias = state.store.listar::<Academia>().await;

    let mut corpo = Vec::with_capacity(personais.len());
    for personal in &personais {
        if apenas_ativos && personal.status != Status::Ativo {
            continue;
        }
        let mut doc = serde_json::to_value(personal)?;
        doc["academia"] = json!(nome_da_academia(personal, &academias));
        corpo.push(doc);
    }
    Ok(corpo)
}

// GET /api/personais
pub async fn listar(State(state): State<AppState>) -> AppResult<Json<Vec<Value>>> {
    Ok(Json(listar_com_academia(&state, false).await?))
}

// GET /api/personais/ativos
pub async fn ativos(State(state): State<AppState>) -> AppResult<Json<Vec<Value>>> {
    let corpo = listar_com_academia(&state, true).await?;
    tracing::debug!("📤 {} personais ativos servidos ao filtro público", corpo.len());
    Ok(Json(corpo))
}

// GET /api/personais/{id}
pub async fn buscar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Personal>> {
    let personal = state.store.buscar::<Personal>(id).await?.ok_or_else(nao_encontrado)?;
    Ok(Json(personal))
}

// POST /api/personais
pub async fn criar(
    State(state): State<AppState>,
    Json(entrada): Json<PersonalEntrada>,
) -> AppResult<impl IntoResponse> {
    let faltando = entrada.faltando();
    if !faltando.is_empty() {
        return Err(AppError::Validacao(format!(
            "Campos obrigatórios faltando: {}",
            faltando.join(", ")
        )));
    }

    let mut personal = Personal { criado_em: agora_iso(), ..Personal::default() };
    entrada.aplicar(&mut personal);

    state.store.gravar(&mut personal)?.aguardar_arquivo().await?;
    state.realtime.transmitir("personal-criado", serde_json::to_value(&personal)?).await;
    if personal.status == Status::Ativo {
        state
            .realtime
            .transmitir_publico("personal-aprovado", serde_json::to_value(&personal)?)
            .await;
    }
    tracing::info!("✅ Personal criado: {} ({})", personal.nome, personal.status);

    Ok((StatusCode::CREATED, Json(personal)))
}

// PUT /api/personais/{id}
pub async fn atualizar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(entrada): Json<PersonalEntrada>,
) -> AppResult<Json<Personal>> {
    let mut personal = state.store.buscar::<Personal>(id).await?.ok_or_else(nao_encontrado)?;
    let anterior = personal.status;

    entrada.aplicar(&mut personal);
    personal.atualizado_em = Some(agora_iso());

    state.store.gravar(&mut personal)?.aguardar_arquivo().await?;
    state.realtime.transmitir("personal-atualizado", serde_json::to_value(&personal)?).await;
    if anterior != Status::Ativo && personal.status == Status::Ativo {
        tracing::info!("🎉 Personal aprovado: {}", personal.nome);
        state
            .realtime
            .transmitir_publico("personal-aprovado", serde_json::to_value(&personal)?)
            .await;
    }

    Ok(Json(personal))
}

// DELETE /api/personais/{id}
pub async fn excluir(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let personal = state.store.buscar::<Personal>(id).await?.ok_or_else(nao_encontrado)?;

    state.store.remover::<Personal>(id).aguardar_arquivo().await?;
    state.realtime.transmitir("personal-excluido", json!({ "id": id })).await;
    tracing::info!("🗑️ Personal excluído: {} (id {id})", personal.nome);

    Ok(Json(json!({
        "success": true,
        "message": "Personal excluído com sucesso",
        "personal": personal,
    })))
}

// POST /api/personais/aprovar-pendentes
pub async fn aprovar_pendentes(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let personais = state.store.listar::<Personal>().await;
    let mut aprovados = 0;

    for mut personal in personais {
        if personal.status != Status::Pendente {
            continue;
        }
        personal.status = Status::Ativo;
        personal.atualizado_em = Some(agora_iso());
        state.store.gravar(&mut personal)?.aguardar_arquivo().await?;
        state
            .realtime
            .transmitir_publico("personal-aprovado", serde_json::to_value(&personal)?)
            .await;
        aprovados += 1;
    }

    if aprovados == 0 {
        return Ok(Json(json!({
            "success": true,
            "message": "Não há personais pendentes",
            "aprovados": 0,
        })));
    }

    tracing::info!("✅ {aprovados} personais aprovados em massa");
    Ok(Json(json!({
        "success": true,
        "message": format!("{aprovados} personais aprovados com sucesso"),
        "aprovados": aprovados,
    })))
}
