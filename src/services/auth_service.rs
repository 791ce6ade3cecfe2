// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{Sessao, Status, Usuario, UsuarioPublico},
    store::{agora_iso, Store},
};
use chrono::Utc;
use lazy_static::lazy_static;
use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use regex::Regex;
use serde_json::json;
use sha2::Sha512;
use subtle::ConstantTimeEq;

/// Iterações do PBKDF2. Os hashes já emitidos foram derivados com este
/// valor; mudar aqui invalidaria todas as senhas guardadas.
const ITERACOES_PBKDF2: u32 = 10_000;
/// Tamanho da chave derivada em bytes (128 caracteres em hex).
const TAMANHO_CHAVE: usize = 64;

// --- Codec de credenciais ---

/// Gera um salt aleatório de 16 bytes, codificado em hex.
pub fn gerar_salt() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Deriva o hash PBKDF2-HMAC-SHA512 de uma senha.
///
/// O salt entra como *string* hex: são os bytes UTF-8 dela que alimentam a
/// derivação, porque foi assim que os hashes existentes foram gerados.
pub fn derivar_hash(senha: &str, salt_hex: &str) -> String {
    let mut chave = [0u8; TAMANHO_CHAVE];
    pbkdf2_hmac::<Sha512>(senha.as_bytes(), salt_hex.as_bytes(), ITERACOES_PBKDF2, &mut chave);
    hex::encode(chave)
}

/// Confere a senha contra o par salt + hash guardado, em tempo constante.
/// Valores malformados apenas não conferem; nunca há pânico.
pub fn conferir_senha(senha: &str, salt_hex: &str, hash_hex: &str) -> bool {
    let calculado = derivar_hash(senha, salt_hex);
    calculado.as_bytes().ct_eq(hash_hex.as_bytes()).into()
}

/// Deriva salt + hash fora do executor (a derivação é CPU-bound).
pub async fn hash_senha(senha: &str) -> AppResult<(String, String)> {
    let senha = senha.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Derivando hash PBKDF2...");
        let salt = gerar_salt();
        let hash = derivar_hash(&senha, &salt);
        (salt, hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (hash_senha): {:?}", e);
        AppError::InternalServerError
    })
}

/// Verifica a senha fora do executor.
pub async fn verificar_senha(senha: &str, salt: &str, hash: &str) -> AppResult<bool> {
    let senha = senha.to_string();
    let salt = salt.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verificando hash PBKDF2...");
        conferir_senha(&senha, &salt, &hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (verificar_senha): {:?}", e);
        AppError::InternalServerError
    })
}

// --- Emissão de tokens ---

/// Token de sessão opaco: 32 bytes aleatórios em hex (64 caracteres).
pub fn gerar_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn email_valido(email: &str) -> bool {
    lazy_static! {
        static ref RE_EMAIL: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    RE_EMAIL.is_match(email)
}

// --- Fluxos de conta e sessão ---

/// Cria uma conta nova. A unicidade do email vale nos dois backends: a
/// conta pode existir só no remoto ou só no arquivo local e ainda assim
/// bloqueia o cadastro.
pub async fn cadastrar(
    store: &Store,
    nome: &str,
    email: &str,
    senha: &str,
    ip: Option<String>,
) -> AppResult<UsuarioPublico> {
    if senha.len() < 6 {
        return Err(AppError::Validacao(
            "A senha deve ter pelo menos 6 caracteres".into(),
        ));
    }
    let email = email.trim().to_lowercase();
    if !email_valido(&email) {
        return Err(AppError::Validacao("Email inválido".into()));
    }
    if store.usuario_existe(&email).await? {
        return Err(AppError::Validacao("Email já cadastrado".into()));
    }

    let (salt, hash) = hash_senha(senha).await?;
    let usuario = Usuario {
        name: nome.trim().to_string(),
        email: email.clone(),
        senha_hash: hash,
        senha_salt: salt,
        role: "user".into(),
        status: Status::Ativo,
        criado_em: agora_iso(),
        ultimo_login: None,
    };
    let publico = UsuarioPublico::from(&usuario);

    // A resposta só sai depois da cópia local durar; a escrita remota
    // segue em voo.
    store.gravar_usuario(&usuario)?.aguardar_arquivo().await?;
    store.registrar_log("cadastro", json!({ "email": email }), ip);
    tracing::info!("✅ Novo usuário cadastrado: {email}");
    Ok(publico)
}

/// Autentica e abre uma sessão de 24 horas.
pub async fn entrar(
    store: &Store,
    email: &str,
    senha: &str,
    ip: Option<String>,
) -> AppResult<(String, UsuarioPublico)> {
    let email = email.trim().to_lowercase();
    let Some(mut usuario) = store.buscar_usuario(&email).await? else {
        return Err(AppError::NaoAutorizado("Email não encontrado".into()));
    };

    if !verificar_senha(senha, &usuario.senha_salt, &usuario.senha_hash).await? {
        tracing::warn!("🔑 Senha incorreta para {email}");
        return Err(AppError::NaoAutorizado("Senha incorreta".into()));
    }

    let token = gerar_token();
    let sessao = Sessao {
        token: token.clone(),
        email: email.clone(),
        criado_em: Utc::now().timestamp_millis(),
        ip: ip.clone(),
    };
    store.gravar_sessao(&sessao)?.aguardar_arquivo().await?;

    // Último login é cosmético; não atrasa a resposta.
    usuario.ultimo_login = Some(agora_iso());
    let publico = UsuarioPublico::from(&usuario);
    let _ = store.gravar_usuario(&usuario)?;

    store.registrar_log("login", json!({ "email": email }), ip);
    tracing::info!("🔑 Login de {email}");
    Ok((token, publico))
}

/// Valida um token. A expiração é preguiçosa: é aqui que sessões com mais
/// de 24 horas são descobertas e removidas.
pub async fn verificar_sessao(store: &Store, token: &str) -> AppResult<UsuarioPublico> {
    let Some(sessao) = store.buscar_sessao(token).await? else {
        return Err(AppError::NaoAutorizado("Sessão inválida".into()));
    };

    if sessao.expirada(Utc::now().timestamp_millis()) {
        tracing::debug!("🧹 Sessão expirada removida: {}...", abreviar(token));
        store.remover_sessao(token).aguardar_arquivo().await?;
        return Err(AppError::NaoAutorizado("Sessão expirada".into()));
    }

    let Some(usuario) = store.buscar_usuario(&sessao.email).await? else {
        return Err(AppError::NaoAutorizado("Sessão inválida".into()));
    };
    Ok(UsuarioPublico::from(&usuario))
}

/// Encerra a sessão. Token desconhecido não é erro: o resultado final
/// (nenhuma sessão com aquele token) é o mesmo.
pub async fn sair(store: &Store, token: &str, ip: Option<String>) -> AppResult {
    if let Some(sessao) = store.buscar_sessao(token).await? {
        store.registrar_log("logout", json!({ "email": sessao.email }), ip);
    }
    store.remover_sessao(token).aguardar_arquivo().await?;
    tracing::info!("🚪 Logout da sessão {}...", abreviar(token));
    Ok(())
}

fn abreviar(token: &str) -> &str {
    token.get(..10).unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivacao_e_deterministica() {
        let salt = "ab".repeat(16);
        let h1 = derivar_hash("Segredo123", &salt);
        let h2 = derivar_hash("Segredo123", &salt);
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 128);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn salts_diferentes_geram_hashes_diferentes() {
        let s1 = gerar_salt();
        let s2 = gerar_salt();
        assert_ne!(s1, s2);
        assert_eq!(s1.len(), 32);
        assert_ne!(derivar_hash("senha", &s1), derivar_hash("senha", &s2));
    }

    #[test]
    fn conferencia_aceita_a_senha_certa_e_rejeita_a_errada() {
        let salt = gerar_salt();
        let hash = derivar_hash("minha-senha", &salt);
        assert!(conferir_senha("minha-senha", &salt, &hash));
        assert!(!conferir_senha("outra-senha", &salt, &hash));
        assert!(!conferir_senha("minha-senha", &salt, "hash-malformado"));
        assert!(!conferir_senha("minha-senha", "", &hash));
    }

    #[test]
    fn token_tem_64_chars_hex_e_nao_repete() {
        let t1 = gerar_token();
        let t2 = gerar_token();
        assert_eq!(t1.len(), 64);
        assert!(t1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(t1, t2);
    }

    #[test]
    fn valida_formato_de_email() {
        assert!(email_valido("aluno@ifpi.edu.br"));
        assert!(email_valido("a.b+c@x.co"));
        assert!(!email_valido("sem-arroba"));
        assert!(!email_valido("a@b"));
        assert!(!email_valido("a @b.com"));
        assert!(!email_valido(""));
    }
}
