// src/web/academia_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{Academia, AcademiaEntrada, Proprietario, Status},
    state::AppState,
    store::agora_iso,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

fn nao_encontrada() -> AppError {
    AppError::NaoEncontrado("Academia não encontrada".into())
}

fn nome_do_proprietario(academia: &Academia, proprietarios: &[Proprietario]) -> String {
    academia
        .proprietario_id
        .and_then(|id| proprietarios.iter().find(|p| p.id == id))
        .map(|p| p.nome.clone())
        .unwrap_or_else(|| "Não informado".to_string())
}

// GET /api/academias
pub async fn listar(State(state): State<AppState>) -> AppResult<Json<Vec<Value>>> {
    let academias = state.store.listar::<Academia>().await;
    let proprietarios = state.store.listar::<Proprietario>().await;

    let mut corpo = Vec::with_capacity(academias.len());
    for academia in &academias {
        let mut doc = serde_json::to_value(academia)?;
        doc["proprietario_nome"] = json!(nome_do_proprietario(academia, &proprietarios));
        corpo.push(doc);
    }
    Ok(Json(corpo))
}

// GET /api/academias/{id}
pub async fn buscar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let academia = state.store.buscar::<Academia>(id).await?.ok_or_else(nao_encontrada)?;
    let proprietarios = state.store.listar::<Proprietario>().await;

    let mut doc = serde_json::to_value(&academia)?;
    doc["proprietario_nome"] = json!(nome_do_proprietario(&academia, &proprietarios));
    Ok(Json(doc))
}

// POST /api/academias
pub async fn criar(
    State(state): State<AppState>,
    Json(entrada): Json<AcademiaEntrada>,
) -> AppResult<impl IntoResponse> {
    let faltando = entrada.faltando();
    if !faltando.is_empty() {
        return Err(AppError::Validacao(format!(
            "Campos obrigatórios faltando: {}",
            faltando.join(", ")
        )));
    }

    let mut academia = Academia { criado_em: agora_iso(), ..Academia::default() };
    entrada.aplicar(&mut academia);

    state.store.gravar(&mut academia)?.aguardar_arquivo().await?;
    state.realtime.transmitir("academia-criada", serde_json::to_value(&academia)?).await;
    tracing::info!("✅ Academia criada: {} (id {})", academia.nome, academia.id);

    Ok((StatusCode::CREATED, Json(academia)))
}

// PUT /api/academias/{id}
pub async fn atualizar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(entrada): Json<AcademiaEntrada>,
) -> AppResult<Json<Academia>> {
    let mut academia = state.store.buscar::<Academia>(id).await?.ok_or_else(nao_encontrada)?;

    entrada.aplicar(&mut academia);
    academia.atualizado_em = Some(agora_iso());

    state.store.gravar(&mut academia)?.aguardar_arquivo().await?;
    state.realtime.transmitir("academia-atualizada", serde_json::to_value(&academia)?).await;
    Ok(Json(academia))
}

// DELETE /api/academias/{id}
pub async fn excluir(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let academia = state.store.buscar::<Academia>(id).await?.ok_or_else(nao_encontrada)?;

    state.store.remover::<Academia>(id).aguardar_arquivo().await?;
    state.realtime.transmitir("academia-excluida", json!({ "id": id })).await;
    tracing::info!("🗑️ Academia excluída: {} (id {id})", academia.nome);

    Ok(Json(json!({
        "success": true,
        "message": "Academia excluída com sucesso",
        "academia": academia,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusPayload {
    status: Option<String>,
}

// PATCH /api/academias/{id}/status
pub async fn alterar_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusPayload>,
) -> AppResult<Json<Value>> {
    let Some(texto) = payload.status.as_deref() else {
        return Err(AppError::Validacao("Status inválido".into()));
    };
    let novo: Status = texto.parse().map_err(AppError::Validacao)?;

    let mut academia = state.store.buscar::<Academia>(id).await?.ok_or_else(nao_encontrada)?;
    let anterior = academia.status;
    academia.status = novo;
    academia.atualizado_em = Some(agora_iso());

    state.store.gravar(&mut academia)?.aguardar_arquivo().await?;
    state
        .realtime
        .transmitir("academia-status-alterado", json!({ "id": id, "status": novo }))
        .await;
    if anterior != Status::Ativo && novo == Status::Ativo {
        tracing::info!("🎉 Academia aprovada: {}", academia.nome);
        state
            .realtime
            .transmitir_publico("academia-aprovada", serde_json::to_value(&academia)?)
            .await;
    }

    Ok(Json(json!({
        "success": true,
        "message": "Status atualizado",
        "id": id,
        "status": novo,
    })))
}

fn texto_ou<'a>(valor: &'a str, padrao: &'a str) -> &'a str {
    if valor.is_empty() { padrao } else { valor }
}

/// Imagem de capa por tipo, para academias sem foto própria.
fn imagem_padrao(tipo: &str) -> &'static str {
    match tipo {
        "musculacao" => {
            "https://images.unsplash.com/photo-1534438327276-14e5300c3a48?w=600&h=330&fit=crop&q=80"
        }
        "artes-marciais" => {
            "https://images.unsplash.com/photo-1549060279-7e168fce7090?w=600&h=330&fit=crop&q=80"
        }
        "crossfit" => {
            "https://images.unsplash.com/photo-1574680178050-55c6a6a96e0a?w=600&h=330&fit=crop&q=80"
        }
        "yoga" => {
            "https://images.unsplash.com/photo-1544367567-0f2fcb009e0b?w=600&h=330&fit=crop&q=80"
        }
        "pilates" => {
            "https://images.unsplash.com/photo-1599901860904-17e6ed7083a0?w=600&h=330&fit=crop&q=80"
        }
        "danca" => {
            "https://images.unsplash.com/photo-1518693800412-ad92111a1d46?w=600&h=330&fit=crop&q=80"
        }
        _ => "https://images.unsplash.com/photo-1534367507877-0edd93bd013b?w=600&h=330&fit=crop&q=80",
    }
}

/// Visão de vitrine de uma academia, com os padrões de apresentação que
/// a página pública espera.
fn apresentar(academia: &Academia) -> Value {
    json!({
        "id": academia.id,
        "nome": texto_ou(&academia.nome, "Academia"),
        "tipo": texto_ou(&academia.tipo, "musculacao"),
        "preco": format!("{:.2}", academia.preco),
        "endereco": texto_ou(&academia.endereco, "Endereço não informado"),
        "cidade": academia.cidade,
        "estado": academia.estado,
        "telefone": academia.telefone,
        "email": academia.email,
        "descricao": academia.descricao,
        "abertura": texto_ou(&academia.abertura, "06:00"),
        "fechamento": texto_ou(&academia.fechamento, "22:00"),
        "facilidades": academia.facilidades,
        "foto": imagem_padrao(&academia.tipo),
        "status": academia.status,
    })
}

// GET /api/academias-publicas
pub async fn publicas(State(state): State<AppState>) -> Json<Value> {
    let academias = state.store.listar::<Academia>().await;
    let vitrine: Vec<Value> = academias
        .iter()
        .filter(|a| a.status == Status::Ativo)
        .map(apresentar)
        .collect();

    let total = vitrine.len();
    tracing::debug!("🌐 Página pública servida com {total} academias");
    Json(json!({
        "success": true,
        "academias": vitrine,
        "total": total,
        "timestamp": agora_iso(),
    }))
}

// GET /api/academia-publica/{id}
pub async fn publica_detalhe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let academia = state
        .store
        .buscar::<Academia>(id)
        .await?
        .filter(|a| a.status == Status::Ativo)
        .ok_or_else(|| AppError::NaoEncontrado("Academia não encontrada ou inativa".into()))?;

    Ok(Json(json!({ "success": true, "academia": academia })))
}
