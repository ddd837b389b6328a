use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use casehub::config::{self, ClientConfig};
use casehub::net::types::{
    AuditQuery, ClassForm, ClassRow, ConversationQuery, ConversationSettings, Decision, DocumentQuery, DocumentSearch,
    DocumentStatus, NewConversation, SearchLogQuery, SearchQuery, StudentRow, TeacherRow, UserForm,
};
use casehub::net::{ApiClient, ApiError, Registry};
use casehub::pages::admin::{class_body, validate_class_form, validate_user_form};
use casehub::pages::conversations::ConversationWorkbench;
use casehub::pages::login::{self, LoginView, RegisterForm};
use casehub::state::auth::{AuthState, Role};
use casehub::state::session_store::{FileSessionStore, SessionError, SessionStore};
use casehub::util::route_guard;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("not signed in; run `casehub login` first")]
    NotLoggedIn,
    #[error("this command needs a {required} session (signed in as {actual})")]
    WrongRole { required: Role, actual: Role },
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("failed to read {}: {source}", path.display())]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("failed to write {}: {source}", path.display())]
    WriteFile { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "casehub", about = "CaseHub workbench client")]
struct Cli {
    #[arg(long, env = config::API_BASE_ENV)]
    api_base: Option<String>,

    #[arg(long, env = config::SESSION_FILE_ENV)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

struct CliContext {
    api: ApiClient,
    store: Arc<dyn SessionStore>,
}

impl CliContext {
    fn session(&self) -> Result<AuthState, CliError> {
        self.store.get()?.ok_or(CliError::NotLoggedIn)
    }

    /// Current session, which must belong to `role`.
    fn session_as(&self, role: Role) -> Result<AuthState, CliError> {
        let session = self.session()?;
        match route_guard::guard(&role.home_path(), Some(&session)) {
            None => Ok(session),
            Some(_) => Err(CliError::WrongRole { required: role, actual: session.role }),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session.
    Login {
        #[arg(long, value_parser = parse_role)]
        role: Role,
        #[arg(long)]
        account: String,
        #[arg(long, env = "CASEHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Register a student account.
    Register {
        #[arg(long)]
        student_no: String,
        #[arg(long, env = "CASEHUB_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        class_code: String,
        #[arg(long)]
        name: Option<String>,
    },
    Logout,
    Whoami,
    /// Print where navigating to PATH would land.
    Route {
        path: String,
    },
    Health,
    Conv(ConvCommand),
    Doc(DocCommand),
    Audit(AuditCommand),
    Admin(AdminCommand),
    Class(ClassCommand),
    /// Run embedding for an approved document (teacher).
    Embed {
        document_id: i64,
        #[arg(long)]
        chunk_method: Option<String>,
    },
    Search(SearchArgs),
}

#[derive(Args, Debug)]
struct ConvCommand {
    #[command(subcommand)]
    command: ConvSubcommand,
}

#[derive(Subcommand, Debug)]
enum ConvSubcommand {
    List {
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        class_id: Option<i64>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Create {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        class_id: Option<i64>,
    },
    Show {
        conversation_id: i64,
    },
    Send {
        conversation_id: i64,
        content: String,
    },
    Rename {
        conversation_id: i64,
        name: String,
    },
    Clear {
        conversation_id: i64,
    },
    Delete {
        conversation_id: i64,
    },
    Settings {
        conversation_id: i64,
        #[arg(long)]
        model_name: Option<String>,
        #[arg(long)]
        system_prompt: Option<String>,
        #[arg(long)]
        top_n: Option<u32>,
        #[arg(long)]
        similarity_threshold: Option<f64>,
        #[arg(long)]
        show_citations: Option<bool>,
    },
}

#[derive(Args, Debug)]
struct DocCommand {
    #[command(subcommand)]
    command: DocSubcommand,
}

#[derive(Subcommand, Debug)]
enum DocSubcommand {
    List {
        #[arg(long)]
        class_id: Option<i64>,
        #[arg(long, value_delimiter = ',', value_parser = parse_status)]
        status: Vec<DocumentStatus>,
        #[arg(long)]
        filename: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Show {
        document_id: i64,
    },
    Search {
        filename: String,
        #[arg(long)]
        class_id: Option<i64>,
        #[arg(long, default_value_t = false)]
        include_pending: bool,
        #[arg(long, default_value_t = false)]
        include_rejected: bool,
    },
    Upload {
        file: PathBuf,
        #[arg(long)]
        class_id: Option<i64>,
        #[arg(long)]
        mime_type: Option<String>,
    },
    Rename {
        document_id: i64,
        name: String,
    },
    Delete {
        document_id: i64,
    },
    /// Save document content to a file.
    Content {
        document_id: i64,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct AuditCommand {
    #[command(subcommand)]
    command: AuditSubcommand,
}

#[derive(Subcommand, Debug)]
enum AuditSubcommand {
    Pending {
        #[arg(long)]
        class_code: Option<String>,
    },
    List {
        #[arg(long)]
        class_code: Option<String>,
        #[arg(long, value_parser = parse_decision)]
        decision: Option<Decision>,
        #[arg(long)]
        filename: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Show {
        audit_id: i64,
    },
    Decide {
        document_id: i64,
        #[arg(value_parser = parse_decision)]
        decision: Decision,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Args, Debug)]
struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminSubcommand {
    Teachers(RegistryCommand),
    Students(RegistryCommand),
    Classes(ClassRegistryCommand),
}

#[derive(Args, Debug)]
struct RegistryCommand {
    #[command(subcommand)]
    command: RegistrySubcommand,
}

#[derive(Args, Debug, Clone)]
struct UserArgs {
    #[arg(long)]
    account_no: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    class_code: Option<String>,
}

impl From<UserArgs> for UserForm {
    fn from(args: UserArgs) -> Self {
        Self {
            account_no: args.account_no,
            name: args.name,
            email: args.email,
            password: args.password,
            class_code: args.class_code,
        }
    }
}

#[derive(Subcommand, Debug)]
enum RegistrySubcommand {
    List,
    Create(UserArgs),
    Update {
        id: i64,
        #[command(flatten)]
        user: UserArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct ClassRegistryCommand {
    #[command(subcommand)]
    command: ClassRegistrySubcommand,
}

#[derive(Args, Debug, Clone)]
struct ClassArgs {
    #[arg(long)]
    class_code: String,
    #[arg(long)]
    class_name: String,
    #[arg(long)]
    teacher_no: String,
    #[arg(long)]
    embedding_model: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, default_value = casehub::net::types::DEFAULT_CHUNK_METHOD)]
    chunk_method: String,
}

impl From<ClassArgs> for ClassForm {
    fn from(args: ClassArgs) -> Self {
        Self {
            class_code: args.class_code,
            class_name: args.class_name,
            teacher_no: args.teacher_no,
            embedding_model: args.embedding_model,
            description: args.description,
            chunk_method: args.chunk_method,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ClassRegistrySubcommand {
    List,
    Create(ClassArgs),
    Update {
        id: i64,
        #[command(flatten)]
        class: ClassArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct ClassCommand {
    #[command(subcommand)]
    command: ClassSubcommand,
}

#[derive(Subcommand, Debug)]
enum ClassSubcommand {
    /// Classes taught by the signed-in teacher.
    List,
}

#[derive(Args, Debug)]
struct SearchArgs {
    query: String,
    #[arg(long)]
    class_id: Option<i64>,
    #[arg(long, default_value_t = casehub::net::types::DEFAULT_TOP_K)]
    top_k: u32,
    #[arg(long)]
    similarity_threshold: Option<f64>,
    #[arg(long, default_value_t = false)]
    no_highlight: bool,
    /// Show search logs instead of running a query (teacher/admin).
    #[arg(long, default_value_t = false)]
    logs: bool,
    /// Show aggregate search stats instead of running a query (teacher/admin).
    #[arg(long, default_value_t = false)]
    stats: bool,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse()
}

fn parse_decision(raw: &str) -> Result<Decision, String> {
    raw.parse()
}

fn parse_status(raw: &str) -> Result<DocumentStatus, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pending" => Ok(DocumentStatus::Pending),
        "approved" => Ok(DocumentStatus::Approved),
        "rejected" => Ok(DocumentStatus::Rejected),
        "embedded" => Ok(DocumentStatus::Embedded),
        other => Err(format!("unknown status: {other}")),
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    config::load_dotenv();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let mut cfg = ClientConfig::from_env();
    if let Some(api_base) = cli.api_base.filter(|b| !b.trim().is_empty()) {
        cfg.api_base = api_base.trim().trim_end_matches('/').to_owned();
    }
    if let Some(session_file) = cli.session_file {
        cfg.session_file = session_file;
    }

    let ctx = CliContext {
        api: ApiClient::from_config(&cfg)?,
        store: Arc::new(FileSessionStore::new(cfg.session_file)),
    };

    match cli.command {
        Command::Login { role, account, password } => run_login(&ctx, role, account, password).await,
        Command::Register { student_no, password, class_code, name } => {
            let form = RegisterForm { student_no, password, class_code, name: name.unwrap_or_default() };
            run_register(&ctx, form).await
        }
        Command::Logout => {
            let target = login::logout(ctx.store.as_ref())?;
            println!("{target}");
            Ok(())
        }
        Command::Whoami => print_json(&ctx.session()?),
        Command::Route { path } => {
            let session = ctx.store.get()?;
            println!("{}", route_guard::resolve(&path, session.as_ref()));
            Ok(())
        }
        Command::Health => print_json(&ctx.api.health().await?),
        Command::Conv(conv) => run_conv(&ctx, conv).await,
        Command::Doc(doc) => run_doc(&ctx, doc).await,
        Command::Audit(audit) => run_audit(&ctx, audit).await,
        Command::Admin(admin) => run_admin(&ctx, admin).await,
        Command::Class(class) => match class.command {
            ClassSubcommand::List => {
                let session = ctx.session_as(Role::Teacher)?;
                print_json(&ctx.api.list_teacher_classes(session.id).await?)
            }
        },
        Command::Embed { document_id, chunk_method } => {
            let session = ctx.session_as(Role::Teacher)?;
            print_json(
                &ctx.api
                    .run_embedding(&session, document_id, chunk_method.as_deref())
                    .await?,
            )
        }
        Command::Search(args) => run_search(&ctx, args).await,
    }
}

async fn run_login(ctx: &CliContext, role: Role, account: String, password: String) -> Result<(), CliError> {
    let mut view = LoginView::new(ctx.api.clone(), Arc::clone(&ctx.store));
    view.role = role;
    view.account = account;
    view.password = password;
    match view.submit().await {
        Some(target) => {
            println!("{target}");
            Ok(())
        }
        None => Err(view_error(view.feedback.error)),
    }
}

async fn run_register(ctx: &CliContext, form: RegisterForm) -> Result<(), CliError> {
    let mut view = LoginView::new(ctx.api.clone(), Arc::clone(&ctx.store));
    view.register = form;
    view.submit_register().await;
    match view.feedback.notice {
        Some(notice) if view.feedback.error.is_none() => {
            println!("{notice}");
            Ok(())
        }
        _ => Err(view_error(view.feedback.error)),
    }
}

async fn run_conv(ctx: &CliContext, conv: ConvCommand) -> Result<(), CliError> {
    let session = ctx.session()?;
    let api = &ctx.api;
    match conv.command {
        ConvSubcommand::List { keyword, class_id, page } => {
            let query = ConversationQuery { keyword, class_id, page, ..ConversationQuery::default() };
            print_json(&api.list_conversations(&session, &query).await?)
        }
        ConvSubcommand::Create { name, class_id } => {
            let new = NewConversation { name, class_id, ..NewConversation::default() };
            print_json(&api.create_conversation(&session, &new).await?)
        }
        ConvSubcommand::Show { conversation_id } => print_json(&api.get_conversation(&session, conversation_id).await?),
        ConvSubcommand::Send { conversation_id, content } => {
            let mut bench = ConversationWorkbench::new(api.clone(), session);
            bench.open_conversation(conversation_id).await;
            if let Some(error) = bench.feedback.error.take() {
                return Err(CliError::Validation(error));
            }
            let before = bench.messages.len();
            bench.draft = content;
            bench.send_message().await;
            if let Some(error) = bench.feedback.error {
                return Err(CliError::Validation(error));
            }
            let sent: Vec<Value> = bench.messages[before..]
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "id": m.id,
                        "role": m.role,
                        "content": m.content,
                        "reference": m.reference,
                    })
                })
                .collect();
            print_json(&sent)
        }
        ConvSubcommand::Rename { conversation_id, name } => {
            print_json(&api.rename_conversation(&session, conversation_id, &name).await?)
        }
        ConvSubcommand::Clear { conversation_id } => print_json(&api.clear_conversation(&session, conversation_id).await?),
        ConvSubcommand::Delete { conversation_id } => print_json(&api.delete_conversation(&session, conversation_id).await?),
        ConvSubcommand::Settings { conversation_id, model_name, system_prompt, top_n, similarity_threshold, show_citations } => {
            let settings = ConversationSettings { model_name, system_prompt, top_n, similarity_threshold, show_citations };
            if settings.is_empty() {
                return Err(CliError::Validation("Nothing to update.".to_owned()));
            }
            print_json(
                &api.update_conversation_settings(&session, conversation_id, &settings)
                    .await?,
            )
        }
    }
}

async fn run_doc(ctx: &CliContext, doc: DocCommand) -> Result<(), CliError> {
    let session = ctx.session()?;
    let api = &ctx.api;
    match doc.command {
        DocSubcommand::List { class_id, status, filename, page } => {
            let query = DocumentQuery { class_id, statuses: status, filename, page, ..DocumentQuery::default() };
            print_json(&api.list_documents(&session, &query).await?)
        }
        DocSubcommand::Show { document_id } => print_json(&api.get_document(&session, document_id).await?),
        DocSubcommand::Search { filename, class_id, include_pending, include_rejected } => {
            let search = DocumentSearch { filename, class_id, include_pending, include_rejected };
            print_json(&api.search_documents(&session, &search).await?)
        }
        DocSubcommand::Upload { file, class_id, mime_type } => {
            let bytes = std::fs::read(&file).map_err(|source| CliError::ReadFile { path: file.clone(), source })?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| CliError::Validation(format!("not a file: {}", file.display())))?;
            print_json(
                &api.upload_document(&session, class_id, file_name, mime_type.as_deref(), bytes)
                    .await?,
            )
        }
        DocSubcommand::Rename { document_id, name } => {
            print_json(&api.rename_document(&session, document_id, &name).await?)
        }
        DocSubcommand::Delete { document_id } => print_json(&api.delete_document(&session, document_id).await?),
        DocSubcommand::Content { document_id, output } => {
            let content = api.document_content(&session, document_id, true).await?;
            let path = download_path(output, content.file_name.as_deref(), document_id);
            std::fs::write(&path, &content.bytes).map_err(|source| CliError::WriteFile { path: path.clone(), source })?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

async fn run_audit(ctx: &CliContext, audit: AuditCommand) -> Result<(), CliError> {
    let session = ctx.session_as(Role::Admin)?;
    let api = &ctx.api;
    match audit.command {
        AuditSubcommand::Pending { class_code } => print_json(&api.list_pending_audits(class_code.as_deref()).await?),
        AuditSubcommand::List { class_code, decision, filename, page } => {
            let query = AuditQuery { class_code, decision, filename, page, ..AuditQuery::default() };
            print_json(&api.list_audits(&session, &query).await?)
        }
        AuditSubcommand::Show { audit_id } => print_json(&api.get_audit(&session, audit_id).await?),
        AuditSubcommand::Decide { document_id, decision, reason } => print_json(
            &api.decide_audit(&session, document_id, decision, reason.as_deref())
                .await?,
        ),
    }
}

async fn run_admin(ctx: &CliContext, admin: AdminCommand) -> Result<(), CliError> {
    let session = ctx.session_as(Role::Admin)?;
    let api = &ctx.api;
    match admin.command {
        AdminSubcommand::Teachers(cmd) => run_user_registry::<TeacherRow>(api, &session, Role::Teacher, cmd).await,
        AdminSubcommand::Students(cmd) => run_user_registry::<StudentRow>(api, &session, Role::Student, cmd).await,
        AdminSubcommand::Classes(cmd) => match cmd.command {
            ClassRegistrySubcommand::List => {
                let rows: Vec<ClassRow> = api.list_registry(&session, Registry::Classes).await?;
                print_json(&rows)
            }
            ClassRegistrySubcommand::Create(args) => {
                let body = class_request(args, true)?;
                let row: Value = api
                    .create_registry_entry(&session, Registry::Classes, &body)
                    .await?;
                print_json(&row)
            }
            ClassRegistrySubcommand::Update { id, class } => {
                let body = class_request(class, false)?;
                let row: Value = api
                    .update_registry_entry(&session, Registry::Classes, id, &body)
                    .await?;
                print_json(&row)
            }
            ClassRegistrySubcommand::Delete { id } => {
                print_json(&api.delete_registry_entry(&session, Registry::Classes, id).await?)
            }
        },
    }
}

async fn run_user_registry<T>(api: &ApiClient, session: &AuthState, role: Role, cmd: RegistryCommand) -> Result<(), CliError>
where
    T: serde::de::DeserializeOwned + Serialize,
{
    let registry = if role == Role::Student { Registry::Students } else { Registry::Teachers };
    match cmd.command {
        RegistrySubcommand::List => {
            let rows: Vec<T> = api.list_registry(session, registry).await?;
            print_json(&rows)
        }
        RegistrySubcommand::Create(user) => {
            let body = user_request(user, role, true)?;
            let row: Value = api.create_registry_entry(session, registry, &body).await?;
            print_json(&row)
        }
        RegistrySubcommand::Update { id, user } => {
            let body = user_request(user, role, false)?;
            let row: Value = api
                .update_registry_entry(session, registry, id, &body)
                .await?;
            print_json(&row)
        }
        RegistrySubcommand::Delete { id } => print_json(&api.delete_registry_entry(session, registry, id).await?),
    }
}

/// Explicit `--output`, else the server's file name (already reduced to a
/// bare name), else `document-<id>` in the current directory.
fn download_path(output: Option<PathBuf>, server_name: Option<&str>, document_id: i64) -> PathBuf {
    output
        .or_else(|| server_name.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(format!("document-{document_id}")))
}

/// Same checks and trimming as the admin view's account form.
fn user_request(args: UserArgs, role: Role, creating: bool) -> Result<Value, CliError> {
    let form = UserForm::from(args);
    validate_user_form(&form, role, creating).map_err(|m| CliError::Validation(m.to_owned()))?;
    Ok(form.to_body(role))
}

/// Same checks and trimming as the admin view's class form.
fn class_request(args: ClassArgs, creating: bool) -> Result<Value, CliError> {
    let form = ClassForm::from(args);
    validate_class_form(&form, creating).map_err(|m| CliError::Validation(m.to_owned()))?;
    Ok(class_body(&form)?)
}

async fn run_search(ctx: &CliContext, args: SearchArgs) -> Result<(), CliError> {
    let session = ctx.session()?;
    if args.logs || args.stats {
        let query = SearchLogQuery {
            class_id: args.class_id,
            query: Some(args.query).filter(|q| !q.trim().is_empty()),
            ..SearchLogQuery::default()
        };
        return if args.stats {
            print_json(&ctx.api.search_stats(&session, &query).await?)
        } else {
            print_json(&ctx.api.search_logs(&session, &query).await?)
        };
    }

    let query = SearchQuery {
        query: args.query,
        class_id: args.class_id,
        top_k: args.top_k,
        similarity_threshold: args.similarity_threshold,
        highlight: !args.no_highlight,
    };
    casehub::pages::search::validate_search_query(&query).map_err(|m| CliError::Validation(m.to_owned()))?;
    print_json(&ctx.api.search(&session, &query).await?)
}

fn view_error(error: Option<String>) -> CliError {
    CliError::Validation(error.unwrap_or_else(|| "request failed".to_owned()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
