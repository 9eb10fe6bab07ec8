use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};

use crate::runner::executor::RunObserver;
use crate::runner::types::{
    AbortRecord, FileReport, OperationOutcome, OperationReport, RunOutcome, SeedFile, SeedReport,
    SeedSummary,
};
use crate::{ReseedError, Result};

pub struct SeedReporter {
    verbose: bool,
}

impl SeedReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// 打印单个操作结果
    pub fn print_operation(&self, op: &OperationReport) {
        match &op.outcome {
            OperationOutcome::Applied => println!(
                " {} [{}] {} {} {} ({}ms)",
                "✓".green(),
                op.index,
                op.method.cyan(),
                op.url,
                op.status.to_string().green(),
                op.duration.as_millis()
            ),
            OperationOutcome::Skipped { error } => {
                println!(
                    " {} [{}] {} {} {} ({}ms) {}",
                    "⊘".yellow(),
                    op.index,
                    op.method.cyan(),
                    op.url,
                    op.status.to_string().red(),
                    op.duration.as_millis(),
                    "(skipped)".dimmed()
                );
                // verbose 时显示完整的错误响应
                if self.verbose {
                    println!("   {}: {}", "Error".red().bold(), error);
                }
            }
        }
    }

    /// 打印中止位置
    pub fn print_abort(&self, abort: &AbortRecord) {
        let position = match abort.index {
            Some(index) => format!("[{}]", index),
            None => "[-]".to_string(),
        };
        println!(" {} {} {}", "✗".red(), position, abort.file.bold());
        println!("   {}: {}", "Error".red().bold(), abort.error);
    }

    /// 运行结束后的输出：汇总表，中止时附带中止原因
    pub fn print_outcome(&self, outcome: &RunOutcome) {
        match outcome {
            RunOutcome::NoChange => println!("{}", "no change".dimmed()),
            RunOutcome::Applied(report) => self.print_summary(report),
            RunOutcome::Aborted { report, .. } => {
                self.print_summary(report);
                if let Some(abort) = &report.aborted {
                    let position = abort
                        .index
                        .map(|i| format!(" operation #{}", i))
                        .unwrap_or_default();
                    println!(
                        "  {}: {}{}\n",
                        "Aborted".red().bold(),
                        abort.file,
                        position
                    );
                }
            }
        }
    }

    /// 每个文件一行的表格，后面是总计
    pub fn print_summary(&self, report: &SeedReport) {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["File", "Applied", "Skipped", "Duration"]);

        for file in &report.files {
            let skipped = file.skipped();
            let skipped_color = if skipped == 0 {
                Color::Green
            } else {
                Color::Yellow
            };
            table.add_row(vec![
                Cell::new(&file.name),
                Cell::new(file.applied()).fg(Color::Green),
                Cell::new(skipped).fg(skipped_color),
                Cell::new(format!("{}ms", file.duration().as_millis())),
            ]);
        }

        let summary = SeedSummary::from_report(report);
        println!("\n{}", table);
        println!(
            "  {}: {} files, {} applied, {} skipped, {} total",
            "Seed".bold(),
            summary.files,
            summary.applied.to_string().green(),
            summary.skipped.to_string().yellow(),
            summary.total
        );
        println!(
            "  {}: {:.3}s",
            "Duration".bold(),
            summary.total_duration.as_secs_f64()
        );
        println!();
    }

    /// `--json` 的机器可读输出
    pub fn print_json(&self, outcome: &RunOutcome) -> Result<()> {
        let value = match outcome {
            RunOutcome::NoChange => serde_json::json!({ "outcome": "no_change" }),
            RunOutcome::Applied(report) | RunOutcome::Aborted { report, .. } => {
                serde_json::to_value(report).map_err(|e| ReseedError::Other(e.to_string()))?
            }
        };
        let text =
            serde_json::to_string_pretty(&value).map_err(|e| ReseedError::Other(e.to_string()))?;
        println!("{}", text);
        Ok(())
    }
}

impl RunObserver for SeedReporter {
    fn on_file_start(&self, file: &SeedFile, operations: usize) {
        println!(
            "\nSeed {} ({} requests)",
            file.name.bold(),
            operations
        );
    }

    fn on_operation(&self, _file: &SeedFile, operation: &OperationReport) {
        self.print_operation(operation);
    }

    fn on_file_done(&self, file: &SeedFile, _report: &FileReport) {
        println!("migrate file: {} {}", file.name, "success".green());
    }

    fn on_abort(&self, abort: &AbortRecord) {
        self.print_abort(abort);
    }
}
