// src/web/health_handlers.rs
use crate::{error::AppResult, state::AppState, store::agora_iso};
use axum::{extract::State, Json};
use serde_json::{json, Value};

// GET /health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let stats = state.store.estatisticas().await;
    let database = if state.store.remoto_ativo() {
        "Supabase conectado ✅"
    } else {
        "Apenas arquivos JSON 📁"
    };

    Json(json!({
        "status": "online",
        "timestamp": agora_iso(),
        "database": database,
        "stats": stats,
    }))
}

// GET /stats
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let mut corpo = serde_json::to_value(state.store.estatisticas().await)?;
    corpo["sistema"] = json!("Gymp2 - Sistema Unificado");
    Ok(Json(corpo))
}
