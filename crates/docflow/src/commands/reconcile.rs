use crate::InvocationArgs;
use anyhow::Context;
use colored::Colorize;
use docflow_cloud::{CallbackContext, InvocationState, OperationStatus, ProgressEvent, StateManager};
use docflow_cloud_aws::SsmTransport;
use docflow_document::{CreateHandler, HandlerRequest, ResourceModel, STACK_NAME_TAG};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// reconcile / apply の共通処理
///
/// `follow` が true の場合は終端イベントまで待機と呼び出しを繰り返す。
/// 成功 (または進行中で終了) なら true、FAILED なら false を返す。
pub async fn handle(args: &InvocationArgs, follow: bool) -> anyhow::Result<bool> {
    let config = docflow_config::load_config()?;
    let state = StateManager::new(&args.state_dir);
    let lock = state.acquire_lock().await?;

    let transport = Arc::new(SsmTransport::from_env().await);
    let handler = CreateHandler::new(transport, config.stabilization)?;

    let status = run(&state, &handler, args, follow).await?;

    lock.release().await?;
    Ok(status != OperationStatus::Failed)
}

/// 状態の読み込み → 呼び出し → 状態の保存 を繰り返す
async fn run(
    state: &StateManager,
    handler: &CreateHandler,
    args: &InvocationArgs,
    follow: bool,
) -> anyhow::Result<OperationStatus> {
    loop {
        let (model, callback_context, request_token) = prepare(state, args).await?;

        let request = build_request(args, model, &request_token);
        let event = handler.reconcile(&request, callback_context).await;
        print_event(&event, args.json)?;

        match event.status {
            OperationStatus::Success => state.clear().await?,
            // トークンは残し、再実行しても同じ名前で作成を試みる
            OperationStatus::Failed => {
                state
                    .save(
                        &InvocationState::new(event.resource_model.clone(), None)
                            .with_request_token(&request_token),
                    )
                    .await?
            }
            OperationStatus::InProgress => {
                state
                    .save(
                        &InvocationState::new(
                            event.resource_model.clone(),
                            event.callback_context,
                        )
                        .with_request_token(&request_token),
                    )
                    .await?
            }
        }

        if !follow || event.is_terminal() {
            return Ok(event.status);
        }

        tokio::time::sleep(Duration::from_secs(u64::from(event.callback_delay_seconds))).await;
    }
}

/// 今回の呼び出しに使うモデル・コンテキスト・冪等性トークンを決める
///
/// 作成済みなら保存されたモデル（合成済みの名前を含む）で再開する。
/// 未作成ならモデルファイルを読み直し、トークンは保存済みのものを引き継ぐ。
/// 作成呼び出しの前にトークンを保存しておくことで、途中で落ちても名前が変わらない。
async fn prepare(
    state: &StateManager,
    args: &InvocationArgs,
) -> anyhow::Result<(ResourceModel, Option<CallbackContext>, String)> {
    let saved = state.load::<ResourceModel>().await?;

    if let Some(saved) = saved.as_ref().filter(|s| s.create_started()) {
        println!("{}", "保存された状態から再開します".dimmed());
        let request_token = args
            .request_token
            .clone()
            .or_else(|| saved.request_token.clone())
            .unwrap_or_else(generate_request_token);
        return Ok((
            saved.resource_model.clone(),
            saved.callback_context,
            request_token,
        ));
    }

    let model = load_model(&args.model)?;
    let request_token = args
        .request_token
        .clone()
        .or_else(|| saved.and_then(|s| s.request_token))
        .unwrap_or_else(generate_request_token);

    state
        .save(&InvocationState::new(model.clone(), None).with_request_token(&request_token))
        .await?;

    Ok((model, None, request_token))
}

/// モデルファイルを読み込む（JSON は YAML として読める）
fn load_model(path: &Path) -> anyhow::Result<ResourceModel> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("モデルファイルを読み込めません: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("モデルファイルの形式が不正です: {}", path.display()))
}

fn build_request(args: &InvocationArgs, model: ResourceModel, request_token: &str) -> HandlerRequest {
    let mut request = HandlerRequest::new(model, request_token);
    if let Some(stack_name) = &args.stack_name {
        request = request.with_system_tag(STACK_NAME_TAG, stack_name);
    }
    for (key, value) in &args.tags {
        request = request.with_resource_tag(key, value);
    }
    request
}

fn generate_request_token() -> String {
    format!("docflow-{}", chrono::Utc::now().format("%Y%m%dT%H%M%S%.9f"))
}

fn print_event(event: &ProgressEvent<ResourceModel>, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(event)?);
        return Ok(());
    }

    let status = match event.status {
        OperationStatus::InProgress => event.status.to_string().yellow().bold(),
        OperationStatus::Success => event.status.to_string().green().bold(),
        OperationStatus::Failed => event.status.to_string().red().bold(),
    };

    println!();
    println!("{} {}", status, event.resource_model.display_name().cyan());
    if let Some(message) = &event.message {
        println!("  {}", message);
    }
    if let Some(code) = &event.error_code {
        println!("  エラーコード: {}", code.to_string().red());
    }
    if let Some(context) = &event.callback_context {
        println!(
            "  残りポーリング回数: {}",
            context.stabilization_retries_remaining
        );
        println!("  次の呼び出しまで: {}秒", event.callback_delay_seconds);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docflow_cloud::{
        CreateDocumentRequest, CreateDocumentResponse, DescribeDocumentRequest,
        DocumentDescription, DocumentTransport, ProviderError,
    };
    use docflow_config::StabilizationConfig;
    use std::collections::VecDeque;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;

    fn args(tags: Vec<(String, String)>, stack_name: Option<&str>) -> InvocationArgs {
        InvocationArgs {
            model: PathBuf::from("document.yaml"),
            state_dir: PathBuf::from("."),
            request_token: None,
            stack_name: stack_name.map(str::to_string),
            tags,
            json: false,
        }
    }

    #[test]
    fn test_build_request_carries_stack_and_tags() {
        let request = build_request(
            &args(vec![("team".to_string(), "ops".to_string())], Some("mystack")),
            ResourceModel::default(),
            "token-1",
        );

        assert_eq!(request.client_request_token, "token-1");
        assert_eq!(
            request.system_tags.get(STACK_NAME_TAG).map(String::as_str),
            Some("mystack")
        );
        assert_eq!(
            request.desired_resource_tags.get("team").map(String::as_str),
            Some("ops")
        );
    }

    #[test]
    fn test_build_request_without_stack() {
        let request = build_request(&args(vec![], None), ResourceModel::default(), "t");
        assert!(request.system_tags.is_empty());
        assert!(request.desired_resource_tags.is_empty());
    }

    #[test]
    fn test_load_yaml_model() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "DocumentType: Command\nContent:\n  schemaVersion: \"2.2\"\n  mainSteps: []\nTags:\n  env: prod"
        )
        .unwrap();

        let model = load_model(file.path()).unwrap();
        assert_eq!(model.document_type.as_deref(), Some("Command"));
        assert_eq!(model.content["schemaVersion"], "2.2");
        assert_eq!(model.tags.get("env").map(String::as_str), Some("prod"));
        assert!(model.name().is_none());
    }

    #[test]
    fn test_load_json_model() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"Name": "my-doc", "Content": "{{}}", "DocumentFormat": "JSON"}}"#
        )
        .unwrap();

        let model = load_model(file.path()).unwrap();
        assert_eq!(model.name(), Some("my-doc"));
        assert_eq!(model.content, serde_json::json!("{}"));
    }

    #[test]
    fn test_missing_model_file() {
        assert!(load_model(Path::new("/nonexistent/document.yaml")).is_err());
    }

    #[test]
    fn test_generated_tokens_are_prefixed() {
        assert!(generate_request_token().starts_with("docflow-"));
    }

    /// 作成呼び出しの結果を順に返し、リクエストを記録するトランスポート
    #[derive(Default)]
    struct RecordingTransport {
        create_results: Mutex<VecDeque<Result<CreateDocumentResponse, ProviderError>>>,
        describe_statuses: Mutex<VecDeque<&'static str>>,
        created_names: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DocumentTransport for RecordingTransport {
        fn name(&self) -> &str {
            "recording"
        }

        async fn create_document(
            &self,
            request: &CreateDocumentRequest,
        ) -> Result<CreateDocumentResponse, ProviderError> {
            self.created_names.lock().unwrap().push(request.name.clone());
            self.create_results
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected create call")
        }

        async fn describe_document(
            &self,
            request: &DescribeDocumentRequest,
        ) -> Result<DocumentDescription, ProviderError> {
            let status = self
                .describe_statuses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected describe call");
            Ok(DocumentDescription {
                name: request.name.clone(),
                status: Some(status.to_string()),
                ..Default::default()
            })
        }
    }

    fn throttled() -> Result<CreateDocumentResponse, ProviderError> {
        Err(ProviderError::from_code("ThrottlingException", "Rate exceeded").with_status(400))
    }

    fn unnamed_model_args(dir: &Path) -> InvocationArgs {
        let model = dir.join("document.yaml");
        std::fs::write(
            &model,
            "DocumentType: Command\nContent:\n  schemaVersion: \"2.2\"\n  mainSteps: []\n",
        )
        .unwrap();

        InvocationArgs {
            model,
            state_dir: dir.to_path_buf(),
            ..args(vec![], Some("mystack"))
        }
    }

    fn handler(transport: &Arc<RecordingTransport>) -> CreateHandler {
        CreateHandler::new(transport.clone(), StabilizationConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_failed_create_keeps_name_on_rerun() {
        let dir = tempfile::tempdir().unwrap();
        let args = unnamed_model_args(dir.path());
        let state = StateManager::new(dir.path());

        let transport = Arc::new(RecordingTransport::default());
        transport.create_results.lock().unwrap().push_back(throttled());
        transport.create_results.lock().unwrap().push_back(throttled());

        let handler = handler(&transport);
        let first = run(&state, &handler, &args, false).await.unwrap();
        let second = run(&state, &handler, &args, false).await.unwrap();

        assert_eq!(first, OperationStatus::Failed);
        assert_eq!(second, OperationStatus::Failed);

        let names = transport.created_names.lock().unwrap().clone();
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("mystack-document-"));
        assert_eq!(names[0], names[1]);
    }

    #[tokio::test]
    async fn test_token_is_saved_before_create_call() {
        let dir = tempfile::tempdir().unwrap();
        let args = unnamed_model_args(dir.path());
        let state = StateManager::new(dir.path());

        let transport = Arc::new(RecordingTransport::default());
        transport.create_results.lock().unwrap().push_back(throttled());

        // 作成呼び出しの前に落ちた場合と同じ状態を作る
        let (_, context, token) = prepare(&state, &args).await.unwrap();
        assert!(context.is_none());

        run(&state, &handler(&transport), &args, false).await.unwrap();

        let saved = state.load::<ResourceModel>().await.unwrap().unwrap();
        assert_eq!(saved.request_token.as_deref(), Some(token.as_str()));
        assert!(!saved.create_started());
    }

    #[tokio::test]
    async fn test_resume_then_success_clears_state() {
        let dir = tempfile::tempdir().unwrap();
        let args = unnamed_model_args(dir.path());
        let state = StateManager::new(dir.path());

        let transport = Arc::new(RecordingTransport::default());
        transport
            .create_results
            .lock()
            .unwrap()
            .push_back(Ok(CreateDocumentResponse::default()));
        transport.describe_statuses.lock().unwrap().push_back("Active");

        let handler = handler(&transport);
        assert_eq!(
            run(&state, &handler, &args, false).await.unwrap(),
            OperationStatus::InProgress
        );

        let saved = state.load::<ResourceModel>().await.unwrap().unwrap();
        assert!(saved.create_started());
        assert!(saved.request_token.is_some());

        assert_eq!(
            run(&state, &handler, &args, false).await.unwrap(),
            OperationStatus::Success
        );
        assert_eq!(transport.created_names.lock().unwrap().len(), 1);
        assert!(state.load::<ResourceModel>().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_explicit_token_wins_over_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = unnamed_model_args(dir.path());
        let state = StateManager::new(dir.path());

        state
            .save(&InvocationState::new(ResourceModel::default(), None).with_request_token("saved"))
            .await
            .unwrap();

        args.request_token = Some("explicit".to_string());
        let (_, _, token) = prepare(&state, &args).await.unwrap();
        assert_eq!(token, "explicit");

        args.request_token = None;
        let (_, _, token) = prepare(&state, &args).await.unwrap();
        assert_eq!(token, "explicit");
    }
}
