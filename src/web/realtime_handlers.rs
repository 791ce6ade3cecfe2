// src/web/realtime_handlers.rs
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

/// Ações que um cliente pode enviar pelo socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "acao", rename_all = "kebab-case")]
enum AcaoCliente {
    AssinarPublico,
    CancelarPublico,
}

// GET /ws
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| conduzir_socket(socket, state))
}

/// Gere uma conexão WebSocket individual: uma task escoa o canal mpsc
/// para o cliente, a outra lê as ações dele.
async fn conduzir_socket(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Message>(32);
    let id = state.realtime.registrar(tx).await;
    tracing::info!("🔌 Conexão WS {id} aberta ({} ativas)", state.realtime.contar().await);

    let mut envio = tokio::spawn(async move {
        while let Some(mensagem) = rx.recv().await {
            if ws_tx.send(mensagem).await.is_err() {
                break;
            }
        }
    });

    let realtime = state.realtime.clone();
    let mut recepcao = tokio::spawn(async move {
        while let Some(Ok(mensagem)) = ws_rx.next().await {
            match mensagem {
                Message::Text(texto) => match serde_json::from_str::<AcaoCliente>(&texto) {
                    Ok(AcaoCliente::AssinarPublico) => {
                        tracing::debug!("🌐 Conexão {id} assinou o canal público");
                        realtime.assinar_publico(id, true).await;
                    }
                    Ok(AcaoCliente::CancelarPublico) => {
                        realtime.assinar_publico(id, false).await;
                    }
                    Err(e) => {
                        tracing::debug!("Mensagem WS ignorada ({e}): {texto}");
                    }
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Se uma task cai, a outra não fica órfã.
    tokio::select! {
        _ = (&mut envio) => recepcao.abort(),
        _ = (&mut recepcao) => envio.abort(),
    };

    state.realtime.remover(id).await;
    tracing::info!("🔌 Conexão WS {id} fechada");
}
