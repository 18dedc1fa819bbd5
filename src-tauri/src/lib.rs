pub mod cupid;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{SystemTime, UNIX_EPOCH};

use cupid::cases::{CaseLibrary, Scenario};
use cupid::gemini::GeminiClient;
use cupid::render::markdown_to_html;
use cupid::secrets::{resolve_credential, SecretSource, SecretStore};
use cupid::types::{AnalyzeError, GeminiConfig, OutputLanguage};

use serde::Serialize;
use tauri::{Emitter, Manager};
use tracing_subscriber::EnvFilter;

struct AppState {
    library: CaseLibrary,
    client: GeminiClient,
    secrets: SecretStore,
    in_flight: Arc<AtomicBool>,
}

/// Holds the one-analysis-at-a-time slot until dropped.
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag.clone()))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialStatus {
    stored: bool,
    source: Option<SecretSource>,
    model: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CaseList {
    default_label: &'static str,
    scenarios: Vec<Scenario>,
}

impl CaseList {
    fn from_library(library: &CaseLibrary) -> Self {
        Self {
            default_label: library.default_label(),
            scenarios: library.scenarios().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisDoneEvent {
    job_id: String,
    language: OutputLanguage,
    markdown: String,
    html: String,
}

impl AnalysisDoneEvent {
    fn new(job_id: String, language: OutputLanguage, markdown: String) -> Self {
        let html = markdown_to_html(&markdown);
        Self {
            job_id,
            language,
            markdown,
            html,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisErrorEvent {
    job_id: String,
    kind: String,
    message: String,
}

#[tauri::command]
fn cupid_list_cases(state: tauri::State<'_, AppState>) -> CaseList {
    CaseList::from_library(&state.library)
}

#[tauri::command]
fn cupid_lookup_case(state: tauri::State<'_, AppState>, label: String) -> String {
    state.library.lookup(&label).to_string()
}

#[tauri::command]
fn cupid_credential_status(state: tauri::State<'_, AppState>) -> CredentialStatus {
    CredentialStatus {
        stored: state.secrets.credential().is_some(),
        source: state.secrets.source(),
        model: state.client.model().to_string(),
    }
}

/// Validates synchronously, then runs the analysis as a background job.
/// Exactly one of `cupid:analysis:done` / `cupid:analysis:error` follows.
#[tauri::command]
async fn cupid_start_analysis(
    app: tauri::AppHandle,
    state: tauri::State<'_, AppState>,
    narrative: String,
    language: Option<OutputLanguage>,
    api_key: Option<String>,
) -> Result<String, String> {
    let credential = resolve_credential(state.secrets.credential(), api_key.as_deref())
        .ok_or_else(|| AnalyzeError::MissingCredential.to_string())?;
    if narrative.trim().is_empty() {
        return Err(AnalyzeError::MissingNarrative.to_string());
    }

    let guard = InFlightGuard::acquire(&state.in_flight)
        .ok_or_else(|| "An analysis is already running.".to_string())?;

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| e.to_string())?
        .as_millis();
    let job_id = format!("analysis-{}", ts);

    let client = state.client.clone();
    let language = language.unwrap_or_default();
    let jid = job_id.clone();

    tauri::async_runtime::spawn(async move {
        let _guard = guard;

        match client.analyze(&narrative, language, credential.expose()).await {
            Ok(markdown) => {
                let _ = app.emit(
                    "cupid:analysis:done",
                    AnalysisDoneEvent::new(jid, language, markdown),
                );
            }
            Err(e) => {
                let _ = app.emit(
                    "cupid:analysis:error",
                    AnalysisErrorEvent {
                        job_id: jid,
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    },
                );
            }
        }
    });

    Ok(job_id)
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cupid_gui=info"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

pub fn run() {
    init_tracing();

    tauri::Builder::default()
        .setup(|app| {
            let library = CaseLibrary::builtin()?;
            let client = GeminiClient::new(GeminiConfig::from_env())?;
            let secrets = SecretStore::load();

            tracing::info!(
                model = client.model(),
                cases = library.scenarios().len(),
                stored_key = ?secrets.source(),
                "Cupid ready"
            );

            app.manage(AppState {
                library,
                client,
                secrets,
                in_flight: Arc::new(AtomicBool::new(false)),
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            cupid_list_cases,
            cupid_lookup_case,
            cupid_credential_status,
            cupid_start_analysis,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
