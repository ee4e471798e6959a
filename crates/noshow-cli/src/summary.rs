use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use noshow_model::RiskTier;
use noshow_pipeline::{AveragedMetrics, ClassMetrics, ClassificationReport};

use noshow_cli::types::{PredictResult, TrainResult};

/// Rows shown from a scored batch.
const SAMPLE_ROWS: usize = 5;

pub fn print_train_summary(result: &TrainResult) {
    let run = &result.run;
    println!("Training data: {}", result.input.display());
    println!(
        "Outcomes: {} rows, {} attended, {} no-show ({} rows dropped)",
        run.class_counts.total(),
        run.class_counts.attended,
        run.class_counts.no_show,
        run.dropped_rows
    );
    println!(
        "Features: {} columns, {} after encoding",
        run.pipeline.columns().len(),
        run.pipeline.preprocessor().n_features()
    );
    println!(
        "Balanced rows: {} (train {}, holdout {})",
        run.balanced_rows, run.train_rows, run.holdout_rows
    );
    if !run.dropped_columns.is_empty() {
        println!("Ignored columns: {}", run.dropped_columns.join(", "));
    }
    println!("{}", report_table(&run.report));
    println!("Pipeline: {}", result.model_path.display());
    println!("Holdout predictions: {}", result.diagnostics_path.display());
}

pub fn print_predict_summary(result: &PredictResult) {
    let batch = &result.batch;
    println!("Appointments: {}", result.input.display());
    println!("Scored rows: {}", batch.probabilities.len());
    if batch.injected_target {
        println!("No outcome column found; a placeholder was used for scoring only.");
    }
    println!("{}", sample_table(&batch.probabilities, &batch.tiers));

    let mut histogram = Table::new();
    histogram.set_header(vec![
        header_cell("Risk_Level"),
        header_cell("Appointments"),
        header_cell("Share"),
    ]);
    apply_summary_table_style(&mut histogram);
    align_column(&mut histogram, 1, CellAlignment::Right);
    align_column(&mut histogram, 2, CellAlignment::Right);
    let total = batch.tiers.len().max(1) as f64;
    for (tier, count) in batch.tier_counts().into_iter().rev() {
        histogram.add_row(vec![
            tier_cell(tier),
            Cell::new(count),
            Cell::new(format!("{:.1}%", count as f64 * 100.0 / total)),
        ]);
    }
    println!("{histogram}");
    println!("Output: {}", result.output_path.display());
}

/// Per-class metrics, accuracy and averages, in the usual report layout.
pub fn report_table(report: &ClassificationReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(""),
        header_cell("Precision"),
        header_cell("Recall"),
        header_cell("F1"),
        header_cell("Support"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for class in &report.classes {
        table.add_row(class_row(class));
    }
    table.add_row(vec![
        Cell::new("accuracy").add_attribute(Attribute::Bold),
        dim_cell(""),
        dim_cell(""),
        Cell::new(format!("{:.2}", report.accuracy)).add_attribute(Attribute::Bold),
        Cell::new(report.support()),
    ]);
    table.add_row(average_row("macro avg", &report.macro_avg));
    table.add_row(average_row("weighted avg", &report.weighted_avg));
    table
}

fn sample_table(probabilities: &[f64], tiers: &[RiskTier]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("No_Show_Probability"),
        header_cell("Risk_Level"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);
    for (row, (probability, tier)) in probabilities
        .iter()
        .zip(tiers)
        .take(SAMPLE_ROWS)
        .enumerate()
    {
        table.add_row(vec![
            dim_cell(row),
            Cell::new(format!("{probability:.3}")),
            tier_cell(*tier),
        ]);
    }
    table
}

fn class_row(class: &ClassMetrics) -> Vec<Cell> {
    let label = match class.label {
        1 => "1 (no-show)",
        _ => "0 (attended)",
    };
    vec![
        Cell::new(label),
        Cell::new(format!("{:.2}", class.precision)),
        Cell::new(format!("{:.2}", class.recall)),
        Cell::new(format!("{:.2}", class.f1)),
        Cell::new(class.support),
    ]
}

fn average_row(label: &str, metrics: &AveragedMetrics) -> Vec<Cell> {
    vec![
        Cell::new(label),
        Cell::new(format!("{:.2}", metrics.precision)),
        Cell::new(format!("{:.2}", metrics.recall)),
        Cell::new(format!("{:.2}", metrics.f1)),
        Cell::new(metrics.support),
    ]
}

fn tier_cell(tier: RiskTier) -> Cell {
    let color = match tier {
        RiskTier::High => Color::Red,
        RiskTier::Medium => Color::Yellow,
        RiskTier::Low => Color::Green,
    };
    Cell::new(tier.as_str())
        .fg(color)
        .add_attribute(Attribute::Bold)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_table_lists_classes_and_averages() {
        let report = ClassificationReport::from_labels(&[0, 0, 1, 1], &[0, 1, 1, 1]).unwrap();
        let rendered = report_table(&report).to_string();
        for label in ["0 (attended)", "1 (no-show)", "accuracy", "macro avg", "weighted avg"] {
            assert!(rendered.contains(label), "missing {label}");
        }
        assert!(rendered.contains("0.75"));
    }

    #[test]
    fn sample_table_shows_at_most_five_rows() {
        let probabilities = [0.1, 0.5, 0.9, 0.2, 0.3, 0.8, 0.75];
        let tiers: Vec<RiskTier> = probabilities
            .iter()
            .map(|p| RiskTier::from_probability(*p))
            .collect();
        let table = sample_table(&probabilities, &tiers);
        assert_eq!(table.row_count(), SAMPLE_ROWS);
    }
}
