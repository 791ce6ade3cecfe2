// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        academia_handlers, admin_handlers, auth_handlers, health_handlers, mw_auth,
        personal_handlers, proprietario_handlers, realtime_handlers,
    },
};
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::path::PathBuf;
use tower_http::{cors::CorsLayer, services::ServeDir};

pub fn criar_router(app_state: AppState, dir_publico: PathBuf) -> Router {
    // --- Autenticação ---
    let rotas_auth = Router::new()
        .route("/cadastro", post(auth_handlers::cadastro))
        .route("/login", post(auth_handlers::login))
        .route("/verificar-sessao", post(auth_handlers::verificar_sessao))
        .route("/logout", post(auth_handlers::logout));

    // --- Catálogo de academias (painel + vitrine pública) ---
    let rotas_academias = Router::new()
        .route(
            "/api/academias",
            get(academia_handlers::listar).post(academia_handlers::criar),
        )
        .route(
            "/api/academias/{id}",
            get(academia_handlers::buscar)
                .put(academia_handlers::atualizar)
                .delete(academia_handlers::excluir),
        )
        .route("/api/academias/{id}/status", patch(academia_handlers::alterar_status))
        .route("/api/academias-publicas", get(academia_handlers::publicas))
        .route("/api/academia-publica/{id}", get(academia_handlers::publica_detalhe));

    // --- Proprietários ---
    let rotas_proprietarios = Router::new()
        .route(
            "/api/proprietarios",
            get(proprietario_handlers::listar).post(proprietario_handlers::criar),
        )
        .route(
            "/api/proprietarios/{id}",
            get(proprietario_handlers::buscar)
                .put(proprietario_handlers::atualizar)
                .delete(proprietario_handlers::excluir),
        );

    // --- Personais ---
    let rotas_personais = Router::new()
        .route(
            "/api/personais",
            get(personal_handlers::listar).post(personal_handlers::criar),
        )
        .route("/api/personais/ativos", get(personal_handlers::ativos))
        .route(
            "/api/personais/aprovar-pendentes",
            post(personal_handlers::aprovar_pendentes),
        )
        .route(
            "/api/personais/{id}",
            get(personal_handlers::buscar)
                .put(personal_handlers::atualizar)
                .delete(personal_handlers::excluir),
        );

    // --- Administradores ---
    let rotas_admins = Router::new()
        .route(
            "/api/administradores",
            get(admin_handlers::listar).post(admin_handlers::criar),
        )
        .route(
            "/api/administradores/{id}",
            get(admin_handlers::buscar)
                .put(admin_handlers::atualizar)
                .delete(admin_handlers::excluir),
        );

    // --- Sistema ---
    let rotas_sistema = Router::new()
        .route("/health", get(health_handlers::health))
        .route("/stats", get(health_handlers::stats))
        .route("/ws", get(realtime_handlers::ws_handler));

    Router::new()
        .merge(rotas_auth)
        .merge(rotas_academias)
        .merge(rotas_proprietarios)
        .merge(rotas_personais)
        .merge(rotas_admins)
        .merge(rotas_sistema)
        .fallback_service(ServeDir::new(dir_publico))
        .layer(middleware::from_fn_with_state(app_state.clone(), mw_auth::identificar))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        models::{Administrador, Sessao, Status, Usuario, VALIDADE_SESSAO_MS},
        store::{agora_iso, Store},
    };
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn aplicacao() -> (Router, Arc<Store>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            remoto: None,
            dir_dados: dir.path().join("data"),
            dir_publico: dir.path().join("public"),
            porta: 0,
        };
        let store = Arc::new(Store::inicializar(&config).await.unwrap());
        let estado = AppState {
            store: store.clone(),
            realtime: crate::state::RealtimeState::default(),
        };
        (criar_router(estado, config.dir_publico), store, dir)
    }

    async fn requisitar(
        app: &Router,
        metodo: &str,
        caminho: &str,
        token: Option<&str>,
        corpo: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut pedido = Request::builder().method(metodo).uri(caminho);
        if let Some(token) = token {
            pedido = pedido.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let pedido = match corpo {
            Some(corpo) => pedido
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(corpo.to_string()))
                .unwrap(),
            None => pedido.body(Body::empty()).unwrap(),
        };

        let resposta = app.clone().oneshot(pedido).await.unwrap();
        let status = resposta.status();
        let bytes = axum::body::to_bytes(resposta.into_body(), usize::MAX).await.unwrap();
        let corpo = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, corpo)
    }

    #[tokio::test]
    async fn cadastro_login_e_logout_de_ponta_a_ponta() {
        let (app, _store, _dir) = aplicacao().await;

        let (status, corpo) = requisitar(
            &app,
            "POST",
            "/cadastro",
            None,
            Some(json!({ "name": "Maria Silva", "email": "maria@exemplo.com", "password": "segredo1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["success"], json!(true));
        assert_eq!(corpo["user"]["email"], json!("maria@exemplo.com"));
        assert_eq!(corpo["user"]["role"], json!("user"));

        let (status, corpo) = requisitar(
            &app,
            "POST",
            "/cadastro",
            None,
            Some(json!({ "name": "Outra", "email": "maria@exemplo.com", "password": "segredo2" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(corpo["message"], json!("Email já cadastrado"));

        let (status, corpo) = requisitar(
            &app,
            "POST",
            "/cadastro",
            None,
            Some(json!({ "name": "Curta", "email": "curta@exemplo.com", "password": "123" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(corpo["message"], json!("A senha deve ter pelo menos 6 caracteres"));

        let (status, corpo) = requisitar(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({ "email": "maria@exemplo.com", "password": "segredo1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["user"]["name"], json!("Maria Silva"));
        assert_eq!(corpo["redirect"], json!("index.html"));
        let token = corpo["token"].as_str().unwrap().to_string();
        assert_eq!(token.len(), 64);

        let (status, corpo) =
            requisitar(&app, "POST", "/verificar-sessao", None, Some(json!({ "token": token })))
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["user"]["email"], json!("maria@exemplo.com"));

        let (status, corpo) =
            requisitar(&app, "POST", "/logout", None, Some(json!({ "token": token }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["message"], json!("Logout realizado"));

        let (status, corpo) =
            requisitar(&app, "POST", "/verificar-sessao", None, Some(json!({ "token": token })))
                .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(corpo["message"], json!("Sessão inválida"));
    }

    #[tokio::test]
    async fn senha_errada_e_email_desconhecido_dao_401() {
        let (app, _store, _dir) = aplicacao().await;

        let (status, corpo) = requisitar(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({ "email": "ninguem@exemplo.com", "password": "tanto-faz" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(corpo["message"], json!("Email não encontrado"));

        let (status, corpo) = requisitar(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({ "email": "admin@ifpi.edu.br", "password": "errada1" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(corpo["message"], json!("Senha incorreta"));
    }

    #[tokio::test]
    async fn usuario_padrao_semeado_consegue_entrar() {
        let (app, _store, _dir) = aplicacao().await;

        let (status, corpo) = requisitar(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({ "email": "admin@ifpi.edu.br", "password": "123456" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["user"]["role"], json!("admin"));
    }

    #[tokio::test]
    async fn sessao_expirada_e_removida_na_verificacao() {
        let (app, store, _dir) = aplicacao().await;

        let sessao = Sessao {
            token: "tok-antigo".into(),
            email: "admin@ifpi.edu.br".into(),
            criado_em: chrono::Utc::now().timestamp_millis() - VALIDADE_SESSAO_MS - 1,
            ip: None,
        };
        store.gravar_sessao(&sessao).unwrap().aguardar_arquivo().await.unwrap();

        let (status, corpo) = requisitar(
            &app,
            "POST",
            "/verificar-sessao",
            None,
            Some(json!({ "token": "tok-antigo" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(corpo["message"], json!("Sessão expirada"));
        assert!(store.buscar_sessao("tok-antigo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ciclo_da_academia_ate_a_vitrine_publica() {
        let (app, _store, _dir) = aplicacao().await;

        let (status, corpo) = requisitar(&app, "GET", "/api/academias-publicas", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["total"], json!(0));

        let (status, corpo) = requisitar(
            &app,
            "POST",
            "/api/academias",
            None,
            Some(json!({ "nome": "Box Centro", "endereco": "Rua A, 10", "tipo": "crossfit",
                         "preco": 99.9, "status": "pendente" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = corpo["id"].as_i64().unwrap();
        assert!(id > 0);

        // Pendente não aparece na vitrine
        let (_, corpo) = requisitar(&app, "GET", "/api/academias-publicas", None, None).await;
        assert_eq!(corpo["total"], json!(0));

        let (status, corpo) = requisitar(
            &app,
            "PATCH",
            &format!("/api/academias/{id}/status"),
            None,
            Some(json!({ "status": "qualquer" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(corpo["message"], json!("Status inválido: qualquer"));

        let (status, _) = requisitar(
            &app,
            "PATCH",
            &format!("/api/academias/{id}/status"),
            None,
            Some(json!({ "status": "ativo" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, corpo) = requisitar(&app, "GET", "/api/academias-publicas", None, None).await;
        assert_eq!(corpo["total"], json!(1));
        assert_eq!(corpo["academias"][0]["nome"], json!("Box Centro"));
        assert_eq!(corpo["academias"][0]["preco"], json!("99.90"));
        assert!(corpo["academias"][0]["foto"].as_str().unwrap().contains("unsplash"));

        let (status, corpo) =
            requisitar(&app, "GET", &format!("/api/academia-publica/{id}"), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["academia"]["nome"], json!("Box Centro"));

        let (status, corpo) =
            requisitar(&app, "DELETE", &format!("/api/academias/{id}"), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["message"], json!("Academia excluída com sucesso"));

        let (status, _) =
            requisitar(&app, "GET", &format!("/api/academias/{id}"), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn criacao_de_academia_sem_campos_obrigatorios_da_400() {
        let (app, _store, _dir) = aplicacao().await;

        let (status, corpo) = requisitar(
            &app,
            "POST",
            "/api/academias",
            None,
            Some(json!({ "nome": "Sem Endereço" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(corpo["message"], json!("Campos obrigatórios faltando: endereco, tipo"));
    }

    #[tokio::test]
    async fn personal_entra_pendente_e_aprovacao_em_massa_ativa() {
        let (app, _store, _dir) = aplicacao().await;

        let (status, corpo) = requisitar(
            &app,
            "POST",
            "/api/personais",
            None,
            Some(json!({ "nome": "João Treino", "email": "joao@exemplo.com",
                         "especialidade": "funcional" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(corpo["status"], json!("pendente"));

        let (_, corpo) = requisitar(&app, "GET", "/api/personais/ativos", None, None).await;
        assert_eq!(corpo.as_array().unwrap().len(), 0);

        let (status, corpo) =
            requisitar(&app, "POST", "/api/personais/aprovar-pendentes", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["aprovados"], json!(1));
        assert_eq!(corpo["message"], json!("1 personais aprovados com sucesso"));

        let (_, corpo) = requisitar(&app, "GET", "/api/personais/ativos", None, None).await;
        let ativos = corpo.as_array().unwrap();
        assert_eq!(ativos.len(), 1);
        assert_eq!(ativos[0]["academia"], json!("Independente"));

        let (_, corpo) =
            requisitar(&app, "POST", "/api/personais/aprovar-pendentes", None, None).await;
        assert_eq!(corpo["message"], json!("Não há personais pendentes"));
    }

    #[tokio::test]
    async fn guardas_de_exclusao_de_administradores() {
        let (app, store, _dir) = aplicacao().await;

        // O seed deixa o Admin Master (id 1, super_admin) na coleção.
        let (status, corpo) = requisitar(&app, "DELETE", "/api/administradores/1", None, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(corpo["message"], json!("Não é possível excluir um Super Administrador"));

        let (status, corpo) = requisitar(
            &app,
            "POST",
            "/api/administradores",
            None,
            Some(json!({ "nome": "Gestor", "email": "gestor@gym.com", "senha": "segredo1",
                         "nivel": "admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id_gestor = corpo["id"].as_i64().unwrap();

        let (status, corpo) = requisitar(
            &app,
            "POST",
            "/api/administradores",
            None,
            Some(json!({ "nome": "Operador", "email": "admin@ifpi.edu.br", "senha": "segredo1",
                         "nivel": "admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id_proprio = corpo["id"].as_i64().unwrap();

        // Quem está logado como admin@ifpi.edu.br não derruba a própria conta
        let (_, corpo) = requisitar(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({ "email": "admin@ifpi.edu.br", "password": "123456" })),
        )
        .await;
        let token = corpo["token"].as_str().unwrap().to_string();
        let (status, corpo) = requisitar(
            &app,
            "DELETE",
            &format!("/api/administradores/{id_proprio}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(corpo["message"], json!("Você não pode excluir sua própria conta"));

        // Com o Admin Master desativado, o último ativo não pode cair
        let mut master = store.buscar::<Administrador>(1).await.unwrap().unwrap();
        master.status = Status::Inativo;
        store.gravar(&mut master).unwrap().aguardar_arquivo().await.unwrap();

        let (status, _) = requisitar(
            &app,
            "DELETE",
            &format!("/api/administradores/{id_gestor}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, corpo) = requisitar(
            &app,
            "DELETE",
            &format!("/api/administradores/{id_proprio}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(corpo["message"], json!("Não é possível excluir o último administrador ativo"));
    }

    #[tokio::test]
    async fn so_super_admin_mexe_em_super_admin() {
        let (app, store, _dir) = aplicacao().await;

        let (status, corpo) = requisitar(
            &app,
            "PUT",
            "/api/administradores/1",
            None,
            Some(json!({ "nome": "Outro Nome" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            corpo["message"],
            json!("Apenas super administradores podem modificar outros super admins")
        );

        let chefe = Usuario {
            name: "Chefe".into(),
            email: "chefe@gym.com".into(),
            senha_hash: String::new(),
            senha_salt: String::new(),
            role: "super_admin".into(),
            status: Status::Ativo,
            criado_em: agora_iso(),
            ultimo_login: None,
        };
        store.gravar_usuario(&chefe).unwrap().aguardar_arquivo().await.unwrap();
        let sessao = Sessao {
            token: "tok-chefe".into(),
            email: "chefe@gym.com".into(),
            criado_em: chrono::Utc::now().timestamp_millis(),
            ip: None,
        };
        store.gravar_sessao(&sessao).unwrap().aguardar_arquivo().await.unwrap();

        let (status, corpo) = requisitar(
            &app,
            "PUT",
            "/api/administradores/1",
            Some("tok-chefe"),
            Some(json!({ "nome": "Admin Master Renomeado" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["nome"], json!("Admin Master Renomeado"));
    }

    #[tokio::test]
    async fn health_reporta_o_backend_em_uso() {
        let (app, _store, _dir) = aplicacao().await;

        let (status, corpo) = requisitar(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["status"], json!("online"));
        assert_eq!(corpo["database"], json!("Apenas arquivos JSON 📁"));
        assert_eq!(corpo["stats"]["administradores"], json!(1));
    }
}
