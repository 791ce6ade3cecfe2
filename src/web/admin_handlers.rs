// src/web/admin_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{AdminEntrada, AdminPublico, Administrador, Nivel, Status},
    services::auth_service,
    state::AppState,
    store::agora_iso,
    web::mw_auth::Requisitante,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::{json, Value};

fn nao_encontrado() -> AppError {
    AppError::NaoEncontrado("Administrador não encontrado".into())
}

// GET /api/administradores
pub async fn listar(State(state): State<AppState>) -> Json<Vec<AdminPublico>> {
    let admins = state.store.listar::<Administrador>().await;
    Json(admins.iter().map(AdminPublico::from).collect())
}

// GET /api/administradores/{id}
pub async fn buscar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AdminPublico>> {
    let admin = state.store.buscar::<Administrador>(id).await?.ok_or_else(nao_encontrado)?;
    Ok(Json(AdminPublico::from(&admin)))
}

// POST /api/administradores
pub async fn criar(
    State(state): State<AppState>,
    Extension(Requisitante(requisitante)): Extension<Requisitante>,
    Json(entrada): Json<AdminEntrada>,
) -> AppResult<impl IntoResponse> {
    if !entrada.faltando().is_empty() {
        return Err(AppError::Validacao("Nome, email, senha e nível são obrigatórios".into()));
    }
    let senha = entrada.senha.clone().unwrap_or_default();
    if senha.len() < 6 {
        return Err(AppError::Validacao("Senha deve ter no mínimo 6 caracteres".into()));
    }

    let email = entrada.email.clone().unwrap_or_default();
    let admins = state.store.listar::<Administrador>().await;
    if admins.iter().any(|a| a.email == email) {
        return Err(AppError::Validacao("Este e-mail já está cadastrado".into()));
    }

    let criado_por =
        requisitante.as_ref().map(|u| u.email.clone()).unwrap_or_else(|| "sistema".to_string());
    let (salt, hash) = auth_service::hash_senha(&senha).await?;

    let mut admin = Administrador {
        id: 0,
        nome: String::new(),
        email: String::new(),
        senha_hash: hash,
        senha_salt: salt,
        nivel: Nivel::Admin,
        status: Status::Ativo,
        telefone: None,
        observacoes: None,
        criado_por: Some(criado_por.clone()),
        criado_em: agora_iso(),
        atualizado_em: None,
    };
    entrada.aplicar(&mut admin);

    state.store.gravar(&mut admin)?.aguardar_arquivo().await?;
    state.store.registrar_log(
        "admin_criado",
        json!({ "admin_email": admin.email, "criado_por": criado_por, "nivel": admin.nivel }),
        None,
    );
    state
        .realtime
        .transmitir(
            "admin-criado",
            json!({ "id": admin.id, "nome": admin.nome, "email": admin.email }),
        )
        .await;
    tracing::info!("✅ Administrador criado: {} ({})", admin.email, admin.nome);

    Ok((StatusCode::CREATED, Json(AdminPublico::from(&admin))))
}

// PUT /api/administradores/{id}
pub async fn atualizar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(Requisitante(requisitante)): Extension<Requisitante>,
    Json(entrada): Json<AdminEntrada>,
) -> AppResult<Json<AdminPublico>> {
    let mut admin = state.store.buscar::<Administrador>(id).await?.ok_or_else(nao_encontrado)?;

    // Registros super_admin só mudam pelas mãos de outro super_admin.
    let chamador_super = requisitante.as_ref().is_some_and(|u| u.role == "super_admin");
    if admin.nivel == Nivel::SuperAdmin && !chamador_super {
        return Err(AppError::Proibido(
            "Apenas super administradores podem modificar outros super admins".into(),
        ));
    }

    if let Some(novo_email) = entrada.email.as_deref() {
        if novo_email != admin.email {
            let admins = state.store.listar::<Administrador>().await;
            if admins.iter().any(|a| a.email == novo_email && a.id != id) {
                return Err(AppError::Validacao(
                    "Este e-mail já está em uso por outro administrador".into(),
                ));
            }
        }
    }

    let nova_senha = entrada.senha.clone().filter(|s| !s.is_empty());
    entrada.aplicar(&mut admin);
    if let Some(senha) = nova_senha {
        if senha.len() < 6 {
            return Err(AppError::Validacao("Senha deve ter no mínimo 6 caracteres".into()));
        }
        let (salt, hash) = auth_service::hash_senha(&senha).await?;
        admin.senha_hash = hash;
        admin.senha_salt = salt;
    }
    admin.atualizado_em = Some(agora_iso());

    state.store.gravar(&mut admin)?.aguardar_arquivo().await?;
    state.store.registrar_log(
        "admin_atualizado",
        json!({
            "admin_id": id,
            "atualizado_por": requisitante.map(|u| u.email).unwrap_or_else(|| "sistema".into()),
        }),
        None,
    );
    state
        .realtime
        .transmitir("admin-atualizado", json!({ "id": id, "nome": admin.nome }))
        .await;

    Ok(Json(AdminPublico::from(&admin)))
}

// DELETE /api/administradores/{id}
pub async fn excluir(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(Requisitante(requisitante)): Extension<Requisitante>,
) -> AppResult<Json<Value>> {
    let admin = state.store.buscar::<Administrador>(id).await?.ok_or_else(nao_encontrado)?;

    if admin.nivel == Nivel::SuperAdmin {
        return Err(AppError::Proibido("Não é possível excluir um Super Administrador".into()));
    }
    if requisitante.as_ref().is_some_and(|u| u.email == admin.email) {
        return Err(AppError::Proibido("Você não pode excluir sua própria conta".into()));
    }
    let admins = state.store.listar::<Administrador>().await;
    let ativos_restantes =
        admins.iter().filter(|a| a.status == Status::Ativo && a.id != id).count();
    if ativos_restantes == 0 {
        return Err(AppError::Proibido(
            "Não é possível excluir o último administrador ativo".into(),
        ));
    }

    state.store.remover::<Administrador>(id).aguardar_arquivo().await?;
    state.store.registrar_log(
        "admin_excluido",
        json!({
            "admin_email": admin.email,
            "excluido_por": requisitante.map(|u| u.email).unwrap_or_else(|| "sistema".into()),
        }),
        None,
    );
    state.realtime.transmitir("admin-excluido", json!({ "id": id })).await;
    tracing::info!("🗑️ Administrador excluído: {}", admin.email);

    Ok(Json(json!({
        "success": true,
        "message": "Administrador excluído com sucesso",
        "admin": { "id": admin.id, "nome": admin.nome, "email": admin.email },
    })))
}
