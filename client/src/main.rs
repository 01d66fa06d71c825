use actix::{Actor, AsyncContext};
use chrono::Utc;
use client::client_actors::order_session::OrderSessionActor;
use client::client_actors::ui_handler::{UIHandler, parse_command};
use client::config::{ClientConfig, default_email};
use client::gateway::OrderGateway;
use client::gateway::in_memory::InMemoryOrderBackend;
use client::messages::internal_messages::UserCommand;
use colored::Color;
use common::auth::{AuthContext, Viewer};
use common::logger::Logger;
use common::types::dtos::{OrderDTO, RestaurantRefDTO, UserRefDTO};
use common::types::order_status::OrderStatus;
use common::types::user_role::UserRole;
use std::env;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::ctrl_c;

fn demo_viewer(role: UserRole, config: &ClientConfig) -> Viewer {
    let id = match role {
        UserRole::Client => 1,
        UserRole::Owner => 2,
        UserRole::Delivery => 3,
    };
    let email = if role == config.role {
        config.email.clone()
    } else {
        default_email(role).to_string()
    };
    Viewer { id, email, role }
}

fn demo_token(role: UserRole) -> String {
    format!("demo-token-{}", role).to_lowercase()
}

/// Seeds the backend with the demo order and the three demo users.
fn seed_backend(backend: &InMemoryOrderBackend, config: &ClientConfig) {
    for role in UserRole::ALL {
        backend.register_user(demo_token(role), demo_viewer(role, config));
    }
    let customer = demo_viewer(UserRole::Client, config);
    backend.insert_order(OrderDTO {
        id: config.order_id,
        status: OrderStatus::Pending,
        total: Some(18000.0),
        customer: Some(UserRefDTO {
            id: customer.id,
            email: customer.email,
        }),
        driver: None,
        restaurant: Some(RestaurantRefDTO {
            id: 7,
            name: "Kimbap House".to_string(),
        }),
        created_at: Utc::now(),
    });
}

#[actix::main]
async fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let config = match ClientConfig::from_env_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let logger = Logger::new("Main", Color::White);

    let backend = InMemoryOrderBackend::with_latency(config.latency);
    seed_backend(&backend, &config);

    let auth = AuthContext::new();
    if let Err(e) = auth.login(demo_token(config.role), demo_viewer(config.role, &config)) {
        logger.error(format!("Login failed: {}", e));
        std::process::exit(1);
    }
    logger.info(format!(
        "Logged in as {} ({}), opening order #{}",
        config.email, config.role, config.order_id
    ));

    let gateway: Arc<dyn OrderGateway> = Arc::new(backend.connect(auth.clone()));
    let session = match OrderSessionActor::new(config.order_id, &auth, gateway, None) {
        Ok(session) => session,
        Err(e) => {
            logger.error(format!("Could not open the order: {}", e));
            std::process::exit(1);
        }
    };
    let ui = UIHandler::create(|ctx| {
        let session = session.with_observer(ctx.address().recipient()).start();
        UIHandler::new(session, Logger::new("UI", Color::Green))
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = ctrl_c() => {
                logger.info("Ctrl-C received, shutting down...");
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match parse_command(&line) {
                    Some(UserCommand::Quit) => break,
                    Some(command) => {
                        if let Err(e) = ui.send(command).await {
                            logger.error(format!("UI unreachable: {}", e));
                            break;
                        }
                    }
                    None => logger.warn(format!("Unknown command: {}", line.trim())),
                },
                Ok(None) => break,
                Err(e) => {
                    logger.error(format!("Could not read stdin: {}", e));
                    break;
                }
            },
        }
    }

    if let Err(e) = ui.send(UserCommand::Quit).await {
        logger.warn(format!("UI already stopped: {}", e));
    }
    auth.logout();
    actix::System::current().stop();
    Ok(())
}
