//! CLI commands

use anyhow::{Result, bail};
use clap::Subcommand;
use serde::Serialize;
use std::path::Path;
use std::rc::Rc;
use storefront_core::{Credentials, Registration, Role, SessionUser, StorefrontConfig};
use storefront_frontend_common::{
    AppRoute, AuthorizedClient, RouteNavigator, SessionStatus, SessionStore, TokenProvider,
    landing_route,
};
use storefront_http::StorefrontClient;
use tracing::info;

use crate::storage::{FileStorage, SESSION_FILE_NAME};

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create a customer or supplier account
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        phone: String,

        /// Register as a supplier (requires admin approval)
        #[arg(long)]
        supplier: bool,

        /// Accept the Terms & Conditions
        #[arg(long)]
        accept_terms: bool,
    },

    /// Log in with a Google ID token
    GoogleLogin {
        #[arg(long)]
        id_token: String,
    },

    /// End the session on the server and locally
    Logout,

    /// Verify the stored session and show who is logged in
    Whoami,

    /// Check the stored token expiry without contacting the server
    Status,

    /// Product catalog
    Products {
        #[command(subcommand)]
        command: ProductCommands,
    },

    /// Product categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// User accounts
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Supplier onboarding
    Suppliers {
        #[command(subcommand)]
        command: SupplierCommands,
    },

    /// Customer orders
    Orders {
        #[command(subcommand)]
        command: OrderCommands,
    },

    /// Dashboard counters
    Analytics,
}

#[derive(Subcommand)]
pub enum ProductCommands {
    List,
    Search { query: String },
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    List,
}

#[derive(Subcommand)]
pub enum UserCommands {
    List,
}

#[derive(Subcommand)]
pub enum SupplierCommands {
    List,
    Approve { id: String },
    Reject { id: String },
}

#[derive(Subcommand)]
pub enum OrderCommands {
    List,
    SetStatus { id: String, status: String },
}

/// Navigation has no screen to change in the console; the target is logged
struct ConsoleNavigator;

impl RouteNavigator for ConsoleNavigator {
    fn navigate(&self, route: &AppRoute) {
        info!(to = %route, "Session moved to");
    }
}

pub struct Context {
    store: SessionStore,
}

impl Context {
    pub fn new(config: &StorefrontConfig, data_dir: &Path) -> Result<Self> {
        let client = StorefrontClient::from_config(config)?;
        let storage = FileStorage::open(data_dir.join(SESSION_FILE_NAME));
        let store = SessionStore::new(client, Rc::new(storage), config)
            .with_navigator(Rc::new(ConsoleNavigator));
        Ok(Self { store })
    }

    /// Restore the stored session, failing when nobody is logged in
    async fn authorized(&self) -> Result<AuthorizedClient> {
        if self.store.restore_session().await != SessionStatus::Authenticated {
            bail!("Not logged in. Run `storefront login` first.");
        }
        Ok(AuthorizedClient::new(self.store.clone()))
    }
}

impl Commands {
    pub async fn execute(self, ctx: Context) -> Result<()> {
        match self {
            Self::Login { email, password } => {
                let session = ctx.store.login(&Credentials::new(email, password)).await?;
                print_session_user(&session.user);
                Ok(())
            }
            Self::Register {
                name,
                email,
                password,
                phone,
                supplier,
                accept_terms,
            } => {
                let registration = Registration {
                    name,
                    email,
                    password,
                    phone_number: phone,
                    role: if supplier { Role::Supplier } else { Role::User },
                    terms_accepted: accept_terms,
                };
                let session = ctx.store.register(&registration).await?;
                print_session_user(&session.user);
                Ok(())
            }
            Self::GoogleLogin { id_token } => {
                let session = ctx
                    .store
                    .login_with_provider(&TokenProvider(id_token))
                    .await?;
                print_session_user(&session.user);
                Ok(())
            }
            Self::Logout => {
                ctx.store.logout().await;
                println!("Logged out");
                Ok(())
            }
            Self::Whoami => match ctx.store.restore_session().await {
                SessionStatus::Authenticated => {
                    if let Some(user) = ctx.store.current_user() {
                        print_session_user(&user);
                    }
                    Ok(())
                }
                _ => bail!("Not logged in"),
            },
            Self::Status => {
                if ctx.store.is_authenticated() {
                    println!("Authenticated (stored token has not expired)");
                } else {
                    println!("Not authenticated");
                }
                Ok(())
            }
            Self::Products { command } => {
                let client = ctx.authorized().await?;
                match command {
                    ProductCommands::List => print_json(&client.list_products().await?),
                    ProductCommands::Search { query } => {
                        print_json(&client.search_products(&query).await?)
                    }
                    ProductCommands::Delete { id } => {
                        client.delete_product(&id).await?;
                        println!("Deleted product {id}");
                        Ok(())
                    }
                }
            }
            Self::Categories { command } => {
                let client = ctx.authorized().await?;
                match command {
                    CategoryCommands::List => print_json(&client.list_categories().await?),
                }
            }
            Self::Users { command } => {
                let client = ctx.authorized().await?;
                match command {
                    UserCommands::List => print_json(&client.list_users().await?),
                }
            }
            Self::Suppliers { command } => {
                let client = ctx.authorized().await?;
                match command {
                    SupplierCommands::List => print_json(&client.list_suppliers().await?),
                    SupplierCommands::Approve { id } => {
                        print_json(&client.approve_supplier(&id).await?)
                    }
                    SupplierCommands::Reject { id } => {
                        print_json(&client.reject_supplier(&id).await?)
                    }
                }
            }
            Self::Orders { command } => {
                let client = ctx.authorized().await?;
                match command {
                    OrderCommands::List => print_json(&client.list_orders().await?),
                    OrderCommands::SetStatus { id, status } => {
                        print_json(&client.update_order_status(&id, &status).await?)
                    }
                }
            }
            Self::Analytics => {
                let client = ctx.authorized().await?;
                print_json(&client.dashboard_stats().await?)
            }
        }
    }
}

fn print_session_user(user: &SessionUser) {
    let name = if user.display_name.is_empty() {
        &user.email
    } else {
        &user.display_name
    };
    println!("Logged in as {name} <{}> ({})", user.email, user.role);
    println!("Landing page: {}", landing_route(user));
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
