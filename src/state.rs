// src/state.rs
use crate::store::Store;
use axum::extract::ws::Message;
use serde_json::{json, Value};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

// Canal de saída de uma conexão WebSocket individual
type WsTx = mpsc::Sender<Message>;

/// Uma conexão registrada no difusor. `publico` marca quem pediu só o
/// canal público de aprovações.
#[derive(Debug)]
struct Conexao {
    tx: WsTx,
    publico: bool,
}

/// Estado das conexões WebSocket de tempo real.
#[derive(Debug, Clone, Default)]
pub struct RealtimeState {
    conexoes: Arc<Mutex<HashMap<Uuid, Conexao>>>,
}

impl RealtimeState {
    /// Registra uma conexão nova e devolve o seu id.
    pub async fn registrar(&self, tx: WsTx) -> Uuid {
        let id = Uuid::new_v4();
        self.conexoes.lock().await.insert(id, Conexao { tx, publico: false });
        id
    }

    /// Liga ou desliga a assinatura do canal público desta conexão.
    pub async fn assinar_publico(&self, id: Uuid, ligado: bool) {
        if let Some(conexao) = self.conexoes.lock().await.get_mut(&id) {
            conexao.publico = ligado;
        }
    }

    pub async fn remover(&self, id: Uuid) {
        self.conexoes.lock().await.remove(&id);
    }

    pub async fn contar(&self) -> usize {
        self.conexoes.lock().await.len()
    }

    /// Envia um evento para TODAS as conexões ativas.
    pub async fn transmitir(&self, evento: &str, dados: Value) {
        self.enviar(evento, dados, false).await;
    }

    /// Envia um evento só para quem assinou o canal público.
    pub async fn transmitir_publico(&self, evento: &str, dados: Value) {
        self.enviar(evento, dados, true).await;
    }

    async fn enviar(&self, evento: &str, dados: Value, so_publico: bool) {
        let corpo = json!({ "evento": evento, "dados": dados }).to_string();
        let conexoes = self.conexoes.lock().await;
        let mut alcancados = 0;
        for conexao in conexoes.values() {
            if so_publico && !conexao.publico {
                continue;
            }
            // Cliente com o buffer cheio perde o evento em vez de travar
            // a difusão para os demais.
            if conexao.tx.try_send(Message::Text(corpo.clone().into())).is_ok() {
                alcancados += 1;
            }
        }
        tracing::debug!("📡 Evento {evento} para {alcancados} conexões");
    }
}

/// Estado compartilhado da aplicação.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub realtime: RealtimeState,
}

// Permite extrair o Store diretamente nos handlers
impl axum::extract::FromRef<AppState> for Arc<Store> {
    fn from_ref(state: &AppState) -> Arc<Store> {
        state.store.clone()
    }
}

impl axum::extract::FromRef<AppState> for RealtimeState {
    fn from_ref(state: &AppState) -> RealtimeState {
        state.realtime.clone()
    }
}
