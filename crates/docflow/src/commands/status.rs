use colored::Colorize;
use docflow_cloud::StateManager;
use docflow_document::ResourceModel;
use std::path::Path;

pub async fn handle(state_dir: &Path) -> anyhow::Result<()> {
    let state = StateManager::new(state_dir);

    let Some(saved) = state.load::<ResourceModel>().await? else {
        println!("{}", "進行中のワークフローはありません".dimmed());
        return Ok(());
    };

    println!("{}", "進行中のワークフロー:".bold());
    println!(
        "  ドキュメント: {}",
        saved.resource_model.display_name().cyan()
    );
    println!(
        "  保存日時: {}",
        saved.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    match saved.callback_context {
        Some(context) if context.create_document_started => {
            println!("  作成呼び出し: {}", "済み".green());
            println!(
                "  残りポーリング回数: {}",
                context.stabilization_retries_remaining
            );
        }
        _ => println!("  作成呼び出し: {}", "未実行".yellow()),
    }

    Ok(())
}
