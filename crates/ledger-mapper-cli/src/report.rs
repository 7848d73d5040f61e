use chrono::Local;
use colored::*;
use ledger_mapper_core::format::format_size;
use ledger_mapper_core::{EntityGroup, GroupStatus, PlanResult};

const RULE_WIDTH: usize = 80;

fn heading(title: &str) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{:^width$}", title.bold(), width = RULE_WIDTH);
    println!("{}", "=".repeat(RULE_WIDTH));
}

fn group_title(group: &EntityGroup) -> String {
    match group.year {
        Some(year) => format!("{} ({})", group.display_name, year),
        None => group.display_name.clone(),
    }
}

fn status_label(status: GroupStatus) -> ColoredString {
    match status {
        GroupStatus::Planned => "planned".green(),
        GroupStatus::NeedsReview => "needs review".yellow(),
        GroupStatus::Unresolved => "unresolved".red(),
    }
}

fn print_group(result: &PlanResult, group: &EntityGroup) {
    let completeness = if group.is_complete {
        "complete".green()
    } else {
        let missing: Vec<&str> = group.missing.iter().map(|d| d.label()).collect();
        format!("incomplete, missing {}", missing.join(" + ")).yellow()
    };
    println!(
        "\n{}  [{}]  {}  {}",
        group_title(group).bold(),
        completeness,
        format_size(group.total_size_bytes).cyan(),
        status_label(group.status),
    );

    for &id in &group.records {
        let record = &result.records[id];
        let destination = match result.plan_for(id) {
            Some(plan) => plan.target_path().normal(),
            None if result.collided.contains(&id) => "collision".red(),
            None => "not planned".dimmed(),
        };
        println!(
            "  {:<5} {:>10}  {}  -> {}",
            record.doc_type.short_code(),
            format_size(record.size_bytes),
            record.source_path(),
            destination,
        );
    }
}

/// Print the console report: groups ready to go, groups that need a person,
/// the diagnostics behind them, and the run summary.
pub fn print_report(result: &PlanResult) {
    println!();
    heading("LEDGER FILE MAPPING");
    println!("\nGenerated: {}", Local::now().format("%d/%m/%Y %H:%M:%S"));
    println!("Root:      {}", result.root.display());

    let planned: Vec<&EntityGroup> = result.planned_groups().collect();
    let attention: Vec<&EntityGroup> = result.attention_groups().collect();

    println!("\n{} ({})", "Planned groups".green().bold(), planned.len());
    for group in &planned {
        print_group(result, group);
    }

    if !attention.is_empty() {
        println!(
            "\n{} ({})",
            "Groups needing attention".yellow().bold(),
            attention.len()
        );
        for group in &attention {
            print_group(result, group);
        }
    }

    if !result.diagnostics.is_empty() {
        println!("\n{} ({})", "Review".yellow().bold(), result.diagnostics.len());
        for diagnostic in &result.diagnostics {
            if diagnostic.is_blocking() {
                println!("  {} {}", "✗".red(), diagnostic);
            } else {
                println!("  {} {}", "!".yellow(), diagnostic);
            }
        }
    }

    let s = &result.summary;
    println!();
    heading("SUMMARY");
    println!("\nEntities:              {}", s.total_entities);
    println!(
        "Groups:                {} ({} complete, {} incomplete, {} need attention)",
        s.total_groups, s.complete_groups, s.incomplete_groups, s.groups_needing_attention
    );
    println!("Files:                 {}", s.total_files);
    println!("  - Libro Diario:      {}", s.libro_diario_files);
    println!("  - Sumas y Saldos:    {}", s.sumas_saldos_files);
    println!("  - Unclassified:      {}", s.otro_files);
    println!("Multi-part files:      {}", s.multi_part_files);
    println!("Files with year:       {}", s.files_with_year);
    println!("Planned destinations:  {}", s.planned_files);
    println!("Skipped while scanning: {}", s.scan_warnings);
    println!("Total size:            {}", format_size(s.total_size_bytes));
    if !s.extensions.is_empty() {
        let extensions: Vec<String> = s
            .extensions
            .iter()
            .map(|(ext, count)| {
                let ext = if ext.is_empty() { "(none)" } else { ext.as_str() };
                format!("{} {}", ext, count)
            })
            .collect();
        println!("Extensions:            {}", extensions.join(", "));
    }
    println!("{}", "=".repeat(RULE_WIDTH));
}
