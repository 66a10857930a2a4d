use crate::commands::{flag_marks, Context};
use crate::output::Output;
use color_eyre::eyre::{eyre, Result};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use reeltrack_core::{batch_migrate, load_plan, MigrationPlan};
use tracing::info;

pub async fn run_migrate(ctx: &Context, user_id: &str, force: bool, dry_run: bool, output: &Output) -> Result<()> {
    info!("Migrating collection of user {} (force: {}, dry run: {})", user_id, force, dry_run);

    if dry_run {
        let plan = load_plan(&ctx.store, ctx.layout(), user_id, force)
            .await
            .map_err(|e| eyre!("Failed to read collection: {}", e))?;
        print_plan(&plan, output);
        return Ok(());
    }

    let result = batch_migrate(&ctx.store, ctx.layout(), user_id, force).await;

    if output.is_human() {
        if result.success {
            output.success(&result.message);
        } else {
            output.error(&result.message);
        }
    } else {
        output.json(&serde_json::to_value(&result)?);
    }

    if result.success {
        Ok(())
    } else {
        Err(eyre!("{}", result.message))
    }
}

fn print_plan(plan: &MigrationPlan, output: &Output) {
    if !output.is_human() {
        output.json(&serde_json::to_value(plan).unwrap_or_default());
        return;
    }

    if plan.is_empty() {
        output.println("No items to migrate");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Item", "Shape", "Stored", "Migrated", "Status"]);

    for item in &plan.items {
        let marker = if item.changes_flags() { " *" } else { "" };
        table.add_row(vec![
            item.item_id.clone(),
            format!("{:?}", item.shape).to_lowercase(),
            flag_marks(&item.before),
            format!("{}{}", flag_marks(&item.after), marker),
            item.status.to_string(),
        ]);
    }

    output.println(table.to_string());
    output.println(format!(
        "{} items would be written, {} with changed flags",
        plan.items.len(),
        plan.changed_count()
    ));
    if !plan.skipped.is_empty() {
        output.warn(format!("Skipping non-object entries: {}", plan.skipped.join(", ")));
    }
}
