use std::path::PathBuf;
use std::sync::Arc;

use plantbio_api_client::{ApiClient, ClientConfig, RegisterRequest};
use plantbio_core::auth::validation::{
    validate_email, validate_password_reset, validate_sign_in, validate_sign_up,
};
use plantbio_core::auth::{Credentials, decode_claims};
use plantbio_core::models::auth::{AuthUser, Role};
use plantbio_core::routing::{GatePolicy, GuardDecision, RouteDescriptor, RouteGuard, RouteTable};
use plantbio_core::session::{Session, SessionStore};
use plantbio_core::storage::FileStorage;

use crate::Result;
use crate::cli::{Cli, Commands, ResetStep};

/// Where the backend and the persisted session live.
struct Settings {
    api_url: Option<String>,
    data_dir: Option<PathBuf>,
}

/// Backend client plus the session store built on it.
struct Context {
    client: Arc<ApiClient>,
    store: SessionStore,
}

impl Settings {
    fn open(&self) -> Result<Context> {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config.base_url = url.clone();
        }
        let dir = self.data_dir.clone().unwrap_or_else(FileStorage::default_dir);
        log::debug!("session directory: {}", dir.display());

        let client = Arc::new(ApiClient::new(&config)?);
        let store = SessionStore::open(client.clone(), Arc::new(FileStorage::new(dir)))?;
        Ok(Context { client, store })
    }
}

impl Context {
    /// The client, carrying the session's bearer token when signed in.
    fn authed_client(&self) -> ApiClient {
        let client = ApiClient::clone(&self.client);
        match self.store.access_token() {
            Some(token) => client.with_token(token),
            None => client,
        }
    }
}

pub async fn dispatch(args: Cli) -> Result<()> {
    let Cli {
        api_url,
        data_dir,
        command,
    } = args;
    let settings = Settings { api_url, data_dir };

    match command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
        Commands::Login {
            account,
            password,
            no_keep,
        } => {
            validate_sign_in(&account, &password)?;
            let ctx = settings.open()?;
            let credentials = Credentials::password(account, password).keep_signed_in(!no_keep);
            let user = ctx.store.login(credentials).await?;
            print_signed_in(&user);
        }
        Commands::Google { id_token } => {
            let ctx = settings.open()?;
            let response = ctx.client.google(&id_token).await?;
            let user = ctx
                .store
                .login(Credentials::from_login_response(response)?)
                .await?;
            print_signed_in(&user);
        }
        Commands::Logout => {
            let ctx = settings.open()?;
            ctx.store.logout();
            println!("Signed out");
        }
        Commands::Status => {
            let ctx = settings.open()?;
            print_status(&ctx.store.snapshot());
        }
        Commands::Guard { path, legacy_gate } => {
            let ctx = settings.open()?;
            let policy = if legacy_gate {
                GatePolicy::LegacySubstring
            } else {
                GatePolicy::PublicAllowList
            };
            match RouteGuard::with_policy(policy).evaluate(&ctx.store.snapshot(), &path) {
                GuardDecision::Render => println!("render {path}"),
                GuardDecision::Redirect { to, replace: true } => println!("redirect {to} (replace)"),
                GuardDecision::Redirect { to, replace: false } => println!("redirect {to}"),
            }
        }
        Commands::Routes { resolve } => {
            let ctx = settings.open()?;
            let table = RouteTable::application();
            let role = ctx.store.role();
            match resolve {
                Some(path) => match table.resolve(&path, role.as_ref()) {
                    Some(found) => println!("{path} -> {} ({})", found.view, found.pattern),
                    None => println!("{path}: no route"),
                },
                None => print_routes(&table.for_role(role.as_ref()), 0),
            }
        }
        Commands::Register {
            account,
            password,
            name,
            role,
        } => {
            let role = Role::from(role);
            validate_sign_up(&name, &account, &password, &role)?;
            let ctx = settings.open()?;
            ctx.client
                .register(&RegisterRequest {
                    account,
                    password,
                    role,
                    full_name: name,
                })
                .await?;
            println!("Registration successful! You can now sign in.");
        }
        Commands::ForgotPassword { step } => match step {
            ResetStep::Request { email } => {
                validate_email(&email)?;
                let ctx = settings.open()?;
                ctx.authed_client().request_password_reset(&email).await?;
                println!("Verification email sent to {email}.");
            }
            ResetStep::Confirm {
                email,
                code,
                new_password,
            } => {
                validate_password_reset(&email, &code, &new_password)?;
                let ctx = settings.open()?;
                ctx.authed_client()
                    .confirm_password_reset(&email, code.trim(), &new_password)
                    .await?;
                println!("Password reset successful! You can now sign in.");
            }
        },
    }

    Ok(())
}

fn print_signed_in(user: &AuthUser) {
    println!("Signed in as {} ({})", user.display_name(), user.role);
    if let Some(landing) = RouteGuard::default().landing_for(&user.role) {
        println!("Landing page: {landing}");
    }
}

fn print_status(session: &Session) {
    let Some(user) = session.current_user() else {
        println!("Signed out");
        return;
    };
    println!("Signed in as {} ({})", user.display_name(), user.role);
    println!("  id: {}", user.id);
    if let Some(email) = &user.email {
        println!("  email: {email}");
    }
    if let Some(account) = &user.account {
        println!("  account: {account}");
    }
    println!(
        "  kept across restarts: {}",
        if session.keep_signed_in() { "yes" } else { "no" }
    );
    if let Some(permissions) = session.permissions() {
        println!("  permissions: {}", permissions.join(", "));
    }
    // Informational only; expiry is never enforced client-side.
    if let Some(expiry) = session
        .access_token()
        .and_then(|token| decode_claims(token).ok())
        .and_then(|claims| claims.expiry())
    {
        println!("  token expires: {}", expiry.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}

fn print_routes(routes: &[RouteDescriptor], depth: usize) {
    for route in routes {
        let path = if route.index {
            "(index)"
        } else {
            route.path.as_deref().unwrap_or_default()
        };
        let restriction = route
            .required_role
            .as_ref()
            .map(|role| format!(" [{role}]"))
            .unwrap_or_default();
        println!(
            "{:indent$}{path} -> {}{restriction}",
            "",
            route.view,
            indent = depth * 2
        );
        print_routes(&route.children, depth + 1);
    }
}
