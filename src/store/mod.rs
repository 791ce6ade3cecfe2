// src/store/mod.rs
pub mod arquivo;
pub mod remoto;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{
    Academia, Administrador, Nivel, Personal, Proprietario, Sessao, Status, Usuario,
};
use crate::services::auth_service;
use arquivo::Arquivo;
use chrono::{SecondsFormat, Utc};
use remoto::Remoto;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::oneshot;

/// Instante atual em RFC 3339 com milissegundos, o formato de todos os
/// campos `criado_em`/`atualizado_em`.
pub fn agora_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

const COLUNAS_USUARIOS: &[&str] = &[
    "email", "name", "senha_hash", "senha_salt", "role", "status", "criado_em", "ultimo_login",
];
const COLUNAS_SESSOES: &[&str] = &["token", "email", "criado_em", "ip"];

/// Um tipo persistido nas coleções em lista, identificado por `id`.
pub trait Recurso: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABELA: &'static str;
    const COLUNAS: &'static [&'static str];

    fn id(&self) -> i64;
    fn definir_id(&mut self, id: i64);
}

impl Recurso for Academia {
    const TABELA: &'static str = "academias";
    const COLUNAS: &'static [&'static str] = &[
        "id", "nome", "tipo", "preco", "endereco", "cidade", "estado", "telefone", "email",
        "descricao", "facilidades", "abertura", "fechamento", "status", "proprietario_id",
        "criado_em", "atualizado_em",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn definir_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Recurso for Proprietario {
    const TABELA: &'static str = "proprietarios";
    const COLUNAS: &'static [&'static str] = &[
        "id", "nome", "email", "telefone", "cpf", "endereco", "cidade", "estado", "status",
        "criado_em", "atualizado_em",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn definir_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Recurso for Personal {
    const TABELA: &'static str = "personais";
    const COLUNAS: &'static [&'static str] = &[
        "id", "nome", "email", "telefone", "cidade", "bairros", "especialidade",
        "anos_experiencia", "cref", "sobre", "academia_id", "status", "avaliacao",
        "numero_avaliacoes", "criado_em", "atualizado_em",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn definir_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Recurso for Administrador {
    const TABELA: &'static str = "admins";
    const COLUNAS: &'static [&'static str] = &[
        "id", "nome", "email", "senha_hash", "senha_salt", "nivel", "status", "telefone",
        "observacoes", "criado_por", "criado_em", "atualizado_em",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn definir_id(&mut self, id: i64) {
        self.id = id;
    }
}

/// Recibo de uma escrita despachada aos dois destinos.
///
/// A escrita já está em andamento quando o recibo existe. Quem não se
/// importa com o resultado simplesmente o descarta; quem precisa de
/// leitura consistente espera `aguardar_arquivo`, e quem quer o quadro
/// completo espera `aguardar`.
#[derive(Debug)]
pub struct Recibo {
    remoto: Option<oneshot::Receiver<Result<(), String>>>,
    arquivo: Option<oneshot::Receiver<Result<(), String>>>,
}

impl Recibo {
    /// Espera só a cópia local durar. A escrita remota continua em voo.
    pub async fn aguardar_arquivo(mut self) -> AppResult {
        let Some(rx) = self.arquivo.take() else {
            return Ok(());
        };
        match rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) | Err(_) => Err(AppError::InternalServerError),
        }
    }

    /// Espera os dois destinos e devolve o desfecho de cada um.
    pub async fn aguardar(mut self) -> Desfecho {
        let mut desfecho = Desfecho::default();
        if let Some(rx) = self.remoto.take() {
            desfecho.remoto =
                Some(rx.await.unwrap_or_else(|_| Err("tarefa remota abortada".into())));
        }
        if let Some(rx) = self.arquivo.take() {
            desfecho.arquivo =
                Some(rx.await.unwrap_or_else(|_| Err("tarefa local abortada".into())));
        }
        desfecho
    }
}

/// Resultado por destino de uma escrita. `None` significa que o destino
/// não estava configurado.
#[derive(Debug, Default)]
pub struct Desfecho {
    pub remoto: Option<Result<(), String>>,
    pub arquivo: Option<Result<(), String>>,
}

impl Desfecho {
    /// Pelo menos um destino gravou.
    pub fn persistiu(&self) -> bool {
        self.remoto.as_ref().is_some_and(|r| r.is_ok())
            || self.arquivo.as_ref().is_some_and(|r| r.is_ok())
    }
}

/// Lança as duas escritas como tarefas independentes. Uma falha num
/// destino nunca desfaz nem atrasa o outro.
fn disparar<R, A>(tabela: &'static str, op_remota: Option<R>, op_arquivo: A) -> Recibo
where
    R: Future<Output = Result<(), String>> + Send + 'static,
    A: Future<Output = Result<(), String>> + Send + 'static,
{
    let remoto = op_remota.map(|op| {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let resultado = op.await;
            if let Err(e) = &resultado {
                tracing::warn!("⚠️ Escrita remota em {tabela} falhou: {e}");
            }
            let _ = tx.send(resultado);
        });
        rx
    });

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let resultado = op_arquivo.await;
        if let Err(e) = &resultado {
            tracing::error!("❌ Escrita local em {tabela} falhou: {e}");
        }
        let _ = tx.send(resultado);
    });

    Recibo { remoto, arquivo: Some(rx) }
}

/// Contagens agregadas servidas em `/health` e `/stats`.
#[derive(Debug, Serialize)]
pub struct Estatisticas {
    pub academias: usize,
    pub academias_ativas: usize,
    pub proprietarios: usize,
    pub personais: usize,
    pub personais_ativos: usize,
    pub personais_pendentes: usize,
    pub administradores: usize,
    pub usuarios: usize,
    pub sessoes_ativas: usize,
    pub registros_de_atividade: usize,
}

/// Fachada de persistência com dois backends: Supabase (quando
/// configurado) e arquivos JSON locais.
///
/// Leituras preferem o remoto e caem para os arquivos apenas quando a
/// consulta falha; resposta vazia do remoto é resposta, não falha.
/// Escritas vão sempre para os dois destinos em paralelo.
pub struct Store {
    remoto: Option<Remoto>,
    arquivo: Arquivo,
    ultimo_id: AtomicI64,
}

impl Store {
    pub async fn inicializar(config: &Config) -> AppResult<Self> {
        let arquivo = Arquivo::nova(&config.dir_dados);
        arquivo.inicializar().await?;

        let remoto = match &config.remoto {
            Some(cfg) => Remoto::conectar(cfg).await,
            None => {
                tracing::info!("📁 Sem credenciais do Supabase; modo somente arquivos");
                None
            }
        };

        let store = Self { remoto, arquivo, ultimo_id: AtomicI64::new(0) };
        store.semear().await?;
        Ok(store)
    }

    pub fn remoto_ativo(&self) -> bool {
        self.remoto.is_some()
    }

    /// Próximo id: o relógio em milissegundos, saltando para a frente se
    /// o último id emitido já o alcançou. Dois registros criados no
    /// mesmo milissegundo nunca partilham id.
    fn proximo_id(&self) -> i64 {
        let mut agora = Utc::now().timestamp_millis();
        loop {
            let anterior = self.ultimo_id.load(Ordering::Relaxed);
            let candidato = agora.max(anterior + 1);
            match self.ultimo_id.compare_exchange(
                anterior,
                candidato,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidato,
                Err(_) => agora = Utc::now().timestamp_millis(),
            }
        }
    }

    // --- Escritas ---

    /// Grava um registro nos dois destinos, atribuindo id a registros
    /// novos. Devolve o recibo com a escrita já em andamento.
    pub fn gravar<T: Recurso>(&self, registro: &mut T) -> AppResult<Recibo> {
        if registro.id() == 0 {
            registro.definir_id(self.proximo_id());
        }
        let doc = serde_json::to_value(&*registro)?;
        Ok(self.despachar_upsert(T::TABELA, T::COLUNAS, "id", doc))
    }

    pub fn remover<T: Recurso>(&self, id: i64) -> Recibo {
        let op_remota = self.remoto.clone().map(|r| async move {
            r.remover_por_id(T::TABELA, id).await.map(|_| ()).map_err(|e| e.to_string())
        });
        let arquivo = self.arquivo.clone();
        let op_arquivo = async move {
            arquivo.remover_registro(T::TABELA, id).await.map(|_| ()).map_err(|e| e.to_string())
        };
        disparar(T::TABELA, op_remota, op_arquivo)
    }

    pub fn gravar_usuario(&self, usuario: &Usuario) -> AppResult<Recibo> {
        let doc = serde_json::to_value(usuario)?;
        Ok(self.despachar_upsert("usuarios", COLUNAS_USUARIOS, "email", doc))
    }

    pub fn gravar_sessao(&self, sessao: &Sessao) -> AppResult<Recibo> {
        let doc = serde_json::to_value(sessao)?;
        Ok(self.despachar_upsert("sessoes", COLUNAS_SESSOES, "token", doc))
    }

    pub fn remover_sessao(&self, token: &str) -> Recibo {
        let op_remota = self.remoto.clone().map({
            let token = token.to_string();
            |r: Remoto| async move {
                r.remover_por_chave("sessoes", "token", &token)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            }
        });
        let arquivo = self.arquivo.clone();
        let token = token.to_string();
        let op_arquivo = async move {
            arquivo.remover_sessao(&token).await.map(|_| ()).map_err(|e| e.to_string())
        };
        disparar("sessoes", op_remota, op_arquivo)
    }

    fn despachar_upsert(
        &self,
        tabela: &'static str,
        colunas: &'static [&'static str],
        chave: &'static str,
        doc: Value,
    ) -> Recibo {
        let op_remota = self.remoto.clone().map(|r| {
            let doc = doc.clone();
            async move {
                r.gravar(tabela, colunas, chave, &doc).await.map_err(|e| e.to_string())
            }
        });
        let arquivo = self.arquivo.clone();
        let op_arquivo = async move {
            match tabela {
                "usuarios" => arquivo.upsert_usuario(doc).await,
                "sessoes" => arquivo.upsert_sessao(doc).await,
                _ => arquivo.upsert_registro(tabela, doc).await,
            }
            .map_err(|e| e.to_string())
        };
        disparar(tabela, op_remota, op_arquivo)
    }

    // --- Leituras ---

    /// Lista uma coleção como JSON cru. Remoto primeiro; lista vazia do
    /// remoto é o estado real, só erro de consulta cai para os arquivos.
    pub async fn listar_docs(&self, tabela: &str, chave_ordem: &str) -> Vec<Value> {
        if let Some(remoto) = &self.remoto {
            match remoto.listar(tabela, chave_ordem).await {
                Ok(lista) => return lista,
                Err(e) => {
                    tracing::warn!("⚠️ Leitura remota de {tabela} falhou ({e}); usando arquivos")
                }
            }
        }
        match tabela {
            "usuarios" => {
                let doc = self.arquivo.ler_doc_usuarios().await;
                doc.usuarios.into_iter().map(|(_, v)| v).collect()
            }
            "sessoes" => {
                let doc = self.arquivo.ler_doc_sessoes().await;
                doc.sessoes.into_iter().map(|(_, v)| v).collect()
            }
            _ => self.arquivo.ler_colecao(tabela).await,
        }
    }

    /// Lista uma coleção tipada. Registros que não desserializam são
    /// pulados com aviso em vez de derrubar a listagem inteira.
    pub async fn listar<T: Recurso>(&self) -> Vec<T> {
        self.listar_docs(T::TABELA, "id")
            .await
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<T>(doc) {
                Ok(registro) => Some(registro),
                Err(e) => {
                    tracing::warn!("⚠️ Registro malformado em {}: {e}", T::TABELA);
                    None
                }
            })
            .collect()
    }

    pub async fn buscar<T: Recurso>(&self, id: i64) -> AppResult<Option<T>> {
        if let Some(remoto) = &self.remoto {
            match remoto.buscar_por_id(T::TABELA, id).await {
                Ok(Some(doc)) => return Ok(Some(serde_json::from_value(doc)?)),
                Ok(None) => return Ok(None),
                Err(e) => {
                    tracing::warn!("⚠️ Busca remota em {} falhou ({e}); usando arquivos", T::TABELA)
                }
            }
        }
        let achado = self
            .arquivo
            .ler_colecao(T::TABELA)
            .await
            .into_iter()
            .find(|doc| doc.get("id").and_then(Value::as_i64) == Some(id));
        match achado {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Procura um usuário pelos dois backends. Uma conta pode existir só
    /// num dos lados; a autenticação olha ambos antes de negar.
    pub async fn buscar_usuario(&self, email: &str) -> AppResult<Option<Usuario>> {
        if let Some(remoto) = &self.remoto {
            match remoto.buscar_por_chave("usuarios", "email", email).await {
                Ok(Some(doc)) => return Ok(Some(serde_json::from_value(doc)?)),
                Ok(None) => {}
                Err(e) => tracing::warn!("⚠️ Busca remota de usuário falhou ({e})"),
            }
        }
        let doc = self.arquivo.ler_doc_usuarios().await;
        match doc.usuarios.get(email) {
            Some(valor) => Ok(Some(serde_json::from_value(valor.clone())?)),
            None => Ok(None),
        }
    }

    pub async fn usuario_existe(&self, email: &str) -> AppResult<bool> {
        Ok(self.buscar_usuario(email).await?.is_some())
    }

    pub async fn buscar_sessao(&self, token: &str) -> AppResult<Option<Sessao>> {
        if let Some(remoto) = &self.remoto {
            match remoto.buscar_por_chave("sessoes", "token", token).await {
                Ok(Some(doc)) => return Ok(Some(serde_json::from_value(doc)?)),
                Ok(None) => {}
                Err(e) => tracing::warn!("⚠️ Busca remota de sessão falhou ({e})"),
            }
        }
        let doc = self.arquivo.ler_doc_sessoes().await;
        match doc.sessoes.get(token) {
            Some(valor) => Ok(Some(serde_json::from_value(valor.clone())?)),
            None => Ok(None),
        }
    }

    // --- Atividade e estatísticas ---

    /// Registra uma entrada no log de atividades, sem bloquear quem
    /// chamou.
    pub fn registrar_log(&self, tipo: &str, dados: Value, ip: Option<String>) {
        let entrada = json!({
            "tipo": tipo,
            "dados": dados,
            "ip": ip.unwrap_or_else(|| "localhost".into()),
            "timestamp": agora_iso(),
        });
        let arquivo = self.arquivo.clone();
        tokio::spawn(async move {
            if let Err(e) = arquivo.registrar_log(entrada).await {
                tracing::warn!("⚠️ Falha ao registrar atividade: {e}");
            }
        });
    }

    pub async fn estatisticas(&self) -> Estatisticas {
        let academias = self.listar::<Academia>().await;
        let personais = self.listar::<Personal>().await;
        let agora = Utc::now().timestamp_millis();
        let sessoes_ativas = self
            .listar_docs("sessoes", "criado_em")
            .await
            .into_iter()
            .filter_map(|doc| serde_json::from_value::<Sessao>(doc).ok())
            .filter(|s| !s.expirada(agora))
            .count();

        Estatisticas {
            academias: academias.len(),
            academias_ativas: academias.iter().filter(|a| a.status == Status::Ativo).count(),
            proprietarios: self.listar_docs("proprietarios", "id").await.len(),
            personais: personais.len(),
            personais_ativos: personais.iter().filter(|p| p.status == Status::Ativo).count(),
            personais_pendentes: personais.iter().filter(|p| p.status == Status::Pendente).count(),
            administradores: self.listar_docs("admins", "id").await.len(),
            usuarios: self.listar_docs("usuarios", "email").await.len(),
            sessoes_ativas,
            registros_de_atividade: self.arquivo.ler_doc_usuarios().await.logs.len(),
        }
    }

    // --- Dados iniciais ---

    /// Garante o usuário administrador padrão e o admin master do
    /// painel. Roda a cada subida; só grava o que falta.
    async fn semear(&self) -> AppResult {
        if !self.usuario_existe("admin@ifpi.edu.br").await? {
            let salt = auth_service::gerar_salt();
            let usuario = Usuario {
                name: "Administrador".to_string(),
                email: "admin@ifpi.edu.br".to_string(),
                senha_hash: auth_service::derivar_hash("123456", &salt),
                senha_salt: salt,
                role: "admin".to_string(),
                status: Status::Ativo,
                criado_em: agora_iso(),
                ultimo_login: None,
            };
            let desfecho = self.gravar_usuario(&usuario)?.aguardar().await;
            if desfecho.persistiu() {
                tracing::info!("👤 Usuário padrão criado: admin@ifpi.edu.br / 123456");
            } else {
                tracing::error!("❌ Não foi possível criar o usuário padrão");
            }
        }

        if self.listar_docs("admins", "id").await.is_empty() {
            let mut admin = Administrador {
                id: 1,
                nome: "Admin Master".to_string(),
                email: "admin@gym.com".to_string(),
                senha_hash: String::new(),
                senha_salt: String::new(),
                nivel: Nivel::SuperAdmin,
                status: Status::Ativo,
                telefone: None,
                observacoes: None,
                criado_por: Some("sistema".to_string()),
                criado_em: agora_iso(),
                atualizado_em: None,
            };
            let desfecho = self.gravar(&mut admin)?.aguardar().await;
            if desfecho.persistiu() {
                tracing::info!("👤 Admin master criado: admin@gym.com");
            } else {
                tracing::error!("❌ Não foi possível criar o admin master");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::collections::HashSet;

    async fn store_de_teste() -> (Store, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            remoto: None,
            dir_dados: dir.path().to_path_buf(),
            dir_publico: dir.path().to_path_buf(),
            porta: 0,
        };
        let store = Store::inicializar(&config).await.unwrap();
        (store, dir)
    }

    fn academia_exemplo(nome: &str) -> Academia {
        Academia { nome: nome.to_string(), criado_em: agora_iso(), ..Academia::default() }
    }

    #[tokio::test]
    async fn semeia_usuario_padrao_e_admin_master() {
        let (store, _dir) = store_de_teste().await;

        let usuario = store.buscar_usuario("admin@ifpi.edu.br").await.unwrap().unwrap();
        assert_eq!(usuario.role, "admin");
        assert!(auth_service::conferir_senha("123456", &usuario.senha_salt, &usuario.senha_hash));

        let admins = store.listar::<Administrador>().await;
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].id, 1);
        assert_eq!(admins[0].nivel, Nivel::SuperAdmin);
    }

    #[tokio::test]
    async fn gravar_atribui_ids_novos_e_preserva_existentes() {
        let (store, _dir) = store_de_teste().await;

        let mut primeira = academia_exemplo("Alfa");
        let mut segunda = academia_exemplo("Beta");
        store.gravar(&mut primeira).unwrap().aguardar_arquivo().await.unwrap();
        store.gravar(&mut segunda).unwrap().aguardar_arquivo().await.unwrap();
        assert!(primeira.id > 0);
        assert!(segunda.id > primeira.id);

        primeira.nome = "Alfa 2".to_string();
        let id_original = primeira.id;
        store.gravar(&mut primeira).unwrap().aguardar_arquivo().await.unwrap();
        assert_eq!(primeira.id, id_original);

        let lida: Academia = store.buscar(id_original).await.unwrap().unwrap();
        assert_eq!(lida.nome, "Alfa 2");
    }

    #[tokio::test]
    async fn buscar_inexistente_devolve_none() {
        let (store, _dir) = store_de_teste().await;
        assert!(store.buscar::<Academia>(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remover_apaga_o_registro() {
        let (store, _dir) = store_de_teste().await;
        let mut academia = academia_exemplo("Some");
        store.gravar(&mut academia).unwrap().aguardar_arquivo().await.unwrap();

        store.remover::<Academia>(academia.id).aguardar_arquivo().await.unwrap();
        assert!(store.buscar::<Academia>(academia.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sessao_roda_o_ciclo_completo() {
        let (store, _dir) = store_de_teste().await;
        let sessao = Sessao {
            token: "abc123".to_string(),
            email: "x@y.com".to_string(),
            criado_em: Utc::now().timestamp_millis(),
            ip: None,
        };
        store.gravar_sessao(&sessao).unwrap().aguardar_arquivo().await.unwrap();
        assert!(store.buscar_sessao("abc123").await.unwrap().is_some());

        store.remover_sessao("abc123").aguardar_arquivo().await.unwrap();
        assert!(store.buscar_sessao("abc123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn estatisticas_refletem_o_conteudo() {
        let (store, _dir) = store_de_teste().await;
        let mut academia = academia_exemplo("Ativa");
        academia.status = Status::Ativo;
        store.gravar(&mut academia).unwrap().aguardar_arquivo().await.unwrap();

        let stats = store.estatisticas().await;
        assert_eq!(stats.academias, 1);
        assert_eq!(stats.academias_ativas, 1);
        assert_eq!(stats.usuarios, 1);
        assert_eq!(stats.administradores, 1);
        assert_eq!(stats.sessoes_ativas, 0);
    }

    #[tokio::test]
    async fn ids_em_rajada_sao_unicos_e_crescentes() {
        let (store, _dir) = store_de_teste().await;
        let mut vistos = HashSet::new();
        let mut anterior = 0;
        for _ in 0..200 {
            let id = store.proximo_id();
            assert!(id > anterior);
            assert!(vistos.insert(id));
            anterior = id;
        }
    }

    #[test]
    fn desfecho_persistiu_exige_um_sucesso() {
        let nenhum = Desfecho { remoto: None, arquivo: Some(Err("disco cheio".into())) };
        assert!(!nenhum.persistiu());

        let so_remoto = Desfecho { remoto: Some(Ok(())), arquivo: Some(Err("disco cheio".into())) };
        assert!(so_remoto.persistiu());

        let so_arquivo = Desfecho { remoto: None, arquivo: Some(Ok(())) };
        assert!(so_arquivo.persistiu());
    }
}
