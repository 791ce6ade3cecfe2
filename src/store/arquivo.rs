// src/store/arquivo.rs
use crate::error::AppResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::agora_iso;

/// Máximo de entradas mantidas no log de atividades.
const LIMITE_LOGS: usize = 1000;

/// Documento de usuários: objeto chaveado por email, com metadados e o
/// log de atividades do sistema.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocUsuarios {
    #[serde(default = "sistema_padrao")]
    pub sistema: String,
    #[serde(default = "versao_padrao")]
    pub versao: String,
    #[serde(default)]
    pub criado_em: String,
    #[serde(default)]
    pub total_usuarios: usize,
    #[serde(default)]
    pub usuarios: Map<String, Value>,
    #[serde(default)]
    pub logs: Vec<Value>,
}

fn sistema_padrao() -> String {
    "Gymp2".to_string()
}

fn versao_padrao() -> String {
    "3.0".to_string()
}

impl Default for DocUsuarios {
    fn default() -> Self {
        Self {
            sistema: sistema_padrao(),
            versao: versao_padrao(),
            criado_em: agora_iso(),
            total_usuarios: 0,
            usuarios: Map::new(),
            logs: Vec::new(),
        }
    }
}

/// Documento de sessões: objeto chaveado pelo token.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DocSessoes {
    #[serde(default)]
    pub sessoes: Map<String, Value>,
}

/// Backend de arquivos JSON, um arquivo por coleção.
///
/// As escritas releem e regravam o arquivo inteiro e não se excluem
/// mutuamente: entre escritores concorrentes da mesma coleção vence o que
/// terminar por último.
#[derive(Debug, Clone)]
pub struct Arquivo {
    dir: PathBuf,
}

impl Arquivo {
    pub fn nova(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }

    /// Cria o diretório e os arquivos iniciais que ainda não existirem.
    pub async fn inicializar(&self) -> AppResult {
        tokio::fs::create_dir_all(&self.dir).await?;
        for colecao in ["academias", "proprietarios", "personais", "admins"] {
            let caminho = self.caminho(colecao);
            if tokio::fs::try_exists(&caminho).await? {
                continue;
            }
            self.persistir(colecao, &Value::Array(Vec::new())).await?;
        }
        if !tokio::fs::try_exists(self.caminho("usuarios")).await? {
            self.gravar_doc_usuarios(&DocUsuarios::default()).await?;
        }
        if !tokio::fs::try_exists(self.caminho("sessoes")).await? {
            self.gravar_doc_sessoes(&DocSessoes::default()).await?;
        }
        tracing::info!("📁 Arquivos de dados prontos em {}", self.dir.display());
        Ok(())
    }

    fn caminho(&self, tabela: &str) -> PathBuf {
        self.dir.join(format!("{tabela}.json"))
    }

    async fn persistir<T: Serialize>(&self, tabela: &str, dados: &T) -> AppResult {
        let texto = serde_json::to_string_pretty(dados)?;
        tokio::fs::write(self.caminho(tabela), texto).await?;
        Ok(())
    }

    // --- Coleções em lista (academias, proprietarios, personais, admins) ---

    /// Lê uma coleção em lista. Arquivo ausente ou corrompido degrada para
    /// lista vazia, com aviso; só escritas reportam falha ao chamador.
    pub async fn ler_colecao(&self, tabela: &str) -> Vec<Value> {
        match tokio::fs::read_to_string(self.caminho(tabela)).await {
            Ok(texto) => match serde_json::from_str::<Vec<Value>>(&texto) {
                Ok(lista) => lista,
                Err(e) => {
                    tracing::warn!("⚠️ {tabela}.json ilegível ({e}); tratando como vazio");
                    Vec::new()
                }
            },
            Err(e) => {
                tracing::warn!("⚠️ Sem leitura de {tabela}.json ({e}); tratando como vazio");
                Vec::new()
            }
        }
    }

    pub async fn gravar_colecao(&self, tabela: &str, registros: &[Value]) -> AppResult {
        self.persistir(tabela, &registros).await
    }

    /// Insere ou substitui um registro pelo campo `id`.
    pub async fn upsert_registro(&self, tabela: &str, registro: Value) -> AppResult {
        let mut lista = self.ler_colecao(tabela).await;
        let id = registro.get("id").and_then(Value::as_i64);
        match lista
            .iter_mut()
            .find(|r| id.is_some() && r.get("id").and_then(Value::as_i64) == id)
        {
            Some(existente) => *existente = registro,
            None => lista.push(registro),
        }
        self.gravar_colecao(tabela, &lista).await
    }

    /// Remove um registro pelo `id`; devolve se ele existia.
    pub async fn remover_registro(&self, tabela: &str, id: i64) -> AppResult<bool> {
        let mut lista = self.ler_colecao(tabela).await;
        let antes = lista.len();
        lista.retain(|r| r.get("id").and_then(Value::as_i64) != Some(id));
        let removeu = lista.len() < antes;
        if removeu {
            self.gravar_colecao(tabela, &lista).await?;
        }
        Ok(removeu)
    }

    // --- Documento de usuários ---

    pub async fn ler_doc_usuarios(&self) -> DocUsuarios {
        match tokio::fs::read_to_string(self.caminho("usuarios")).await {
            Ok(texto) => serde_json::from_str(&texto).unwrap_or_else(|e| {
                tracing::warn!("⚠️ usuarios.json ilegível ({e}); recomeçando vazio");
                DocUsuarios::default()
            }),
            Err(_) => DocUsuarios::default(),
        }
    }

    pub async fn gravar_doc_usuarios(&self, doc: &DocUsuarios) -> AppResult {
        self.persistir("usuarios", doc).await
    }

    /// Insere ou substitui o usuário chaveado pelo campo `email`.
    pub async fn upsert_usuario(&self, usuario: Value) -> AppResult {
        let Some(email) = usuario.get("email").and_then(Value::as_str).map(str::to_string) else {
            tracing::warn!("⚠️ Usuário sem email descartado na escrita local");
            return Ok(());
        };
        let mut doc = self.ler_doc_usuarios().await;
        doc.usuarios.insert(email, usuario);
        doc.total_usuarios = doc.usuarios.len();
        self.gravar_doc_usuarios(&doc).await
    }

    /// Anexa uma entrada ao log de atividades, descartando as mais
    /// antigas além do limite.
    pub async fn registrar_log(&self, entrada: Value) -> AppResult {
        let mut doc = self.ler_doc_usuarios().await;
        doc.logs.push(entrada);
        if doc.logs.len() > LIMITE_LOGS {
            let excesso = doc.logs.len() - LIMITE_LOGS;
            doc.logs.drain(..excesso);
        }
        self.gravar_doc_usuarios(&doc).await
    }

    // --- Documento de sessões ---

    pub async fn ler_doc_sessoes(&self) -> DocSessoes {
        match tokio::fs::read_to_string(self.caminho("sessoes")).await {
            Ok(texto) => serde_json::from_str(&texto).unwrap_or_else(|e| {
                tracing::warn!("⚠️ sessoes.json ilegível ({e}); recomeçando vazio");
                DocSessoes::default()
            }),
            Err(_) => DocSessoes::default(),
        }
    }

    async fn gravar_doc_sessoes(&self, doc: &DocSessoes) -> AppResult {
        self.persistir("sessoes", doc).await
    }

    pub async fn upsert_sessao(&self, sessao: Value) -> AppResult {
        let Some(token) = sessao.get("token").and_then(Value::as_str).map(str::to_string) else {
            tracing::warn!("⚠️ Sessão sem token descartada na escrita local");
            return Ok(());
        };
        let mut doc = self.ler_doc_sessoes().await;
        doc.sessoes.insert(token, sessao);
        self.gravar_doc_sessoes(&doc).await
    }

    pub async fn remover_sessao(&self, token: &str) -> AppResult<bool> {
        let mut doc = self.ler_doc_sessoes().await;
        let removeu = doc.sessoes.remove(token).is_some();
        if removeu {
            self.gravar_doc_sessoes(&doc).await?;
        }
        Ok(removeu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn arquivo_teste() -> (Arquivo, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let arquivo = Arquivo::nova(dir.path());
        arquivo.inicializar().await.unwrap();
        (arquivo, dir)
    }

    #[tokio::test]
    async fn inicializar_cria_todos_os_arquivos() {
        let (_, dir) = arquivo_teste().await;
        for nome in ["academias", "proprietarios", "personais", "admins", "usuarios", "sessoes"] {
            assert!(dir.path().join(format!("{nome}.json")).exists(), "faltou {nome}.json");
        }
    }

    #[tokio::test]
    async fn upsert_insere_e_depois_substitui() {
        let (arquivo, _dir) = arquivo_teste().await;
        arquivo
            .upsert_registro("academias", json!({ "id": 7, "nome": "A" }))
            .await
            .unwrap();
        arquivo
            .upsert_registro("academias", json!({ "id": 7, "nome": "B" }))
            .await
            .unwrap();
        let lista = arquivo.ler_colecao("academias").await;
        assert_eq!(lista.len(), 1);
        assert_eq!(lista[0]["nome"], "B");
    }

    #[tokio::test]
    async fn remover_informa_se_o_registro_existia() {
        let (arquivo, _dir) = arquivo_teste().await;
        arquivo
            .upsert_registro("personais", json!({ "id": 1, "nome": "P" }))
            .await
            .unwrap();
        assert!(arquivo.remover_registro("personais", 1).await.unwrap());
        assert!(!arquivo.remover_registro("personais", 1).await.unwrap());
        assert!(arquivo.ler_colecao("personais").await.is_empty());
    }

    #[tokio::test]
    async fn usuarios_sao_chaveados_por_email_com_contagem() {
        let (arquivo, _dir) = arquivo_teste().await;
        arquivo
            .upsert_usuario(json!({ "email": "a@x.com", "name": "A" }))
            .await
            .unwrap();
        arquivo
            .upsert_usuario(json!({ "email": "b@x.com", "name": "B" }))
            .await
            .unwrap();
        arquivo
            .upsert_usuario(json!({ "email": "a@x.com", "name": "A2" }))
            .await
            .unwrap();
        let doc = arquivo.ler_doc_usuarios().await;
        assert_eq!(doc.total_usuarios, 2);
        assert_eq!(doc.usuarios["a@x.com"]["name"], "A2");
    }

    #[tokio::test]
    async fn log_de_atividades_respeita_o_limite() {
        let (arquivo, _dir) = arquivo_teste().await;
        let mut doc = arquivo.ler_doc_usuarios().await;
        for i in 0..LIMITE_LOGS {
            doc.logs.push(json!({ "id": i }));
        }
        arquivo.gravar_doc_usuarios(&doc).await.unwrap();

        arquivo.registrar_log(json!({ "id": "novo" })).await.unwrap();
        let doc = arquivo.ler_doc_usuarios().await;
        assert_eq!(doc.logs.len(), LIMITE_LOGS);
        assert_eq!(doc.logs[0]["id"], 1, "a entrada mais antiga sai");
        assert_eq!(doc.logs.last().unwrap()["id"], "novo");
    }

    #[tokio::test]
    async fn corrompido_degrada_para_vazio() {
        let (arquivo, dir) = arquivo_teste().await;
        tokio::fs::write(dir.path().join("academias.json"), "{nada valido")
            .await
            .unwrap();
        assert!(arquivo.ler_colecao("academias").await.is_empty());
    }

    // Dois escritores que se intercalam: ambos leem, o segundo grava, o
    // primeiro grava por cima. O estado final é o da escrita que
    // *terminou* por último, mesmo tendo começado antes.
    #[tokio::test]
    async fn escrita_concorrente_vence_quem_termina_por_ultimo() {
        let (arquivo, _dir) = arquivo_teste().await;
        arquivo
            .upsert_registro("personais", json!({ "id": 5, "status": "pendente" }))
            .await
            .unwrap();

        let mut visao_a = arquivo.ler_colecao("personais").await;
        let mut visao_b = arquivo.ler_colecao("personais").await;
        visao_a[0]["status"] = json!("ativo");
        visao_b[0]["status"] = json!("inativo");

        arquivo.gravar_colecao("personais", &visao_b).await.unwrap();
        arquivo.gravar_colecao("personais", &visao_a).await.unwrap();

        let lista = arquivo.ler_colecao("personais").await;
        assert_eq!(lista[0]["status"], "ativo");
    }
}
