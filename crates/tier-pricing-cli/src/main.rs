use std::path::PathBuf;

use clap::{Parser, Subcommand};
use comfy_table::{presets, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::Style;
use serde::Serialize;
use tier_pricing_core::{
    calculator::{
        self, BreakEven, BreakEvenOutcome, Cost, CostComparison, FeatureMatrix, Recommendation,
        NOT_AVAILABLE,
    },
    report::{self, Report},
    table::{load_bundled_table, load_table, PricingTable},
    tier::{render_value, Allowance, MonthlyPrice, Tier},
    volume::{fmt_calls, fmt_signed_calls, parse_volume},
    PricingError, ReportConfig,
};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Palette ──────────────────────────────────────────────────────────

fn s_header() -> Style { Style::new().color256(252).bold() }  // bright gray, bold
fn s_dim() -> Style    { Style::new().color256(248) }         // light gray
fn s_tree() -> Style   { Style::new().color256(245) }         // mid gray
fn s_hint() -> Style   { Style::new().color256(243) }         // soft gray
fn s_price() -> Style  { Style::new().color256(109) }         // teal
fn s_bold() -> Style   { Style::new().bold() }
fn s_label() -> Style  { Style::new().color256(146) }         // muted lavender

const C_HEAD: Color = Color::AnsiValue(243);
const C_NAME: Color = Color::AnsiValue(252);
const C_PRICE: Color = Color::AnsiValue(109);
const C_DIM: Color = Color::AnsiValue(248);
const C_YES: Color = Color::AnsiValue(114);
const C_QUOTE: Color = Color::AnsiValue(214);

fn sep(width: usize) -> String {
    s_tree().apply_to("\u{2500}".repeat(width)).to_string()
}

fn section(title: &str, width: usize) {
    println!();
    println!("  {}", s_header().apply_to(title));
    println!("  {}", sep(width));
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn head(label: &str) -> Cell {
    Cell::new(label).fg(C_HEAD)
}

fn fmt_cost(cost: Cost) -> Cell {
    match cost {
        Cost::Amount(_) => Cell::new(cost.to_string())
            .fg(C_PRICE)
            .set_alignment(CellAlignment::Right),
        Cost::ContactForQuote => Cell::new(cost.to_string()).fg(C_QUOTE),
    }
}

// ── CLI Args ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "tier-pricing",
    about = "Compare usage-based pricing tiers: cost at volume, optimal tier, break-even points, features",
    version,
    after_help = "examples:\n  \
        tier-pricing                              (full report on the bundled table)\n  \
        tier-pricing --data pricing.json          (full report on your own table)\n  \
        tier-pricing cost 50k 2M                  (cost of every tier at these volumes)\n  \
        tier-pricing optimal 750k                 (cheapest tier)\n  \
        tier-pricing break-even\n  \
        tier-pricing features -f soc2 -f rbac\n  \
        tier-pricing quote serious-business 3M    (one tier at one volume)\n  \
        tier-pricing tiers --json"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Pricing table, JSON or TOML. Defaults to the bundled sample.
    #[arg(long, short, global = true)]
    data: Option<PathBuf>,

    /// Report config (TOML with `volumes` and `features`).
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Volume to report on, e.g. 50000, 50k, 2M. Repeatable.
    #[arg(long = "volume", short = 'v', value_parser = parse_volume_arg, global = true)]
    volumes: Vec<u64>,

    /// Feature key for the matrix. Repeatable.
    #[arg(long = "feature", short = 'f', global = true)]
    features: Vec<String>,

    #[arg(long, short, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly cost of every priced tier at each volume.
    Cost {
        #[arg(value_parser = parse_volume_arg)]
        calls: Vec<u64>,
    },
    /// Cheapest tier at each volume.
    Optimal {
        #[arg(value_parser = parse_volume_arg)]
        calls: Vec<u64>,
    },
    /// Volumes where adjacent tiers cost the same.
    BreakEven,
    /// Feature comparison matrix.
    Features,
    /// Monthly cost of one tier at one volume.
    Quote {
        /// Tier name, e.g. "Serious Business" or serious-business
        tier: String,
        #[arg(value_parser = parse_volume_arg)]
        calls: u64,
    },
    /// List tiers with price, included calls and overage rate.
    Tiers,
}

fn parse_volume_arg(s: &str) -> Result<u64, String> {
    parse_volume(s).map_err(|e| e.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let table = match &cli.data {
        Some(path) => load_table(path)?,
        None => load_bundled_table()?,
    };
    let config = match &cli.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    }
    .with_overrides(cli.volumes.clone(), cli.features.clone())?;
    debug!(volumes = ?config.volumes, features = ?config.features, "report config");

    let pick = |given: Vec<u64>| if given.is_empty() { config.volumes.clone() } else { given };

    match cli.command {
        None => cmd_report(&table, &config, cli.json)?,
        Some(Commands::Cost { calls }) => {
            let cmp = calculator::cost_comparison(&table, &pick(calls));
            if cli.json {
                print_json(&cmp)?;
            } else {
                print_cost_comparison(&cmp);
            }
        }
        Some(Commands::Optimal { calls }) => {
            let recs = calculator::recommendations(&table, &pick(calls));
            if cli.json {
                print_json(&recs)?;
            } else {
                print_recommendations(&recs);
            }
        }
        Some(Commands::BreakEven) => {
            let be = calculator::break_even_analysis(&table);
            if cli.json {
                print_json(&be)?;
            } else {
                print_break_even(&be);
            }
        }
        Some(Commands::Features) => {
            let matrix = calculator::feature_matrix(&table, config.features.as_slice());
            if cli.json {
                print_json(&matrix)?;
            } else {
                print_feature_matrix(&matrix);
            }
        }
        Some(Commands::Quote { tier, calls }) => {
            cmd_quote(&table, &tier, calls, cli.json)?;
        }
        Some(Commands::Tiers) => {
            if cli.json {
                print_json(&table.tiers)?;
            } else {
                print_tiers(&table);
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── Full report ──────────────────────────────────────────────────────

fn cmd_report(table: &PricingTable, config: &ReportConfig, json: bool) -> anyhow::Result<()> {
    let report = report::build_report(table, config);
    if json {
        return print_json(&report);
    }
    print_header(&report);
    print_cost_comparison(&report.cost_comparison);
    print_break_even(&report.break_even);
    print_feature_matrix(&report.feature_matrix);
    print_recommendations(&report.recommendations);
    println!();
    Ok(())
}

fn print_header(report: &Report) {
    println!();
    println!(
        "  {}  {}",
        s_header().apply_to("pricing source"),
        s_label().apply_to(&report.source)
    );
    println!(
        "  {}  {}",
        s_dim().apply_to(format!("{} tiers", report.tiers.len())),
        s_bold().apply_to(report.tiers.join(" \u{00b7} "))
    );
}

// ── Cost ─────────────────────────────────────────────────────────────

fn print_cost_comparison(cmp: &CostComparison) {
    section("cost by volume", 64);
    if cmp.tiers.is_empty() {
        println!("  {}", s_dim().apply_to("no tiers with a numeric price"));
        return;
    }

    let mut table = new_table();
    let mut header = vec![head("  Tool calls/mo")];
    header.extend(cmp.tiers.iter().map(|t| head(t).set_alignment(CellAlignment::Right)));
    table.set_header(header);

    for row in &cmp.rows {
        let mut cells = vec![Cell::new(format!("  {}", fmt_calls(row.calls))).fg(C_NAME)];
        cells.extend(row.costs.iter().map(|&c| fmt_cost(Cost::Amount(c))));
        table.add_row(cells);
    }
    println!("{table}");
}

// ── Break-even ───────────────────────────────────────────────────────

fn print_break_even(rows: &[BreakEven]) {
    section("break-even", 64);
    if rows.is_empty() {
        println!("  {}", s_dim().apply_to("need at least two tiers with a numeric price"));
        return;
    }

    let mut table = new_table();
    table.set_header(vec![head("  From"), head(""), head("To"), head("Break-even (calls/mo)")]);
    for be in rows {
        let point = match be.outcome {
            BreakEvenOutcome::At { calls } => Cell::new(fmt_signed_calls(calls as i64))
                .fg(C_PRICE)
                .set_alignment(CellAlignment::Right),
            BreakEvenOutcome::NotApplicable { reason } => {
                Cell::new(format!("not applicable ({reason})")).fg(C_DIM)
            }
        };
        table.add_row(vec![
            Cell::new(format!("  {}", be.from)).fg(C_NAME),
            Cell::new("\u{2192}").fg(C_HEAD),
            Cell::new(&be.to).fg(C_NAME),
            point,
        ]);
    }
    println!("{table}");
}

// ── Features ─────────────────────────────────────────────────────────

fn feature_cell(value: &str) -> Cell {
    let color = match value {
        "Yes" => C_YES,
        "No" | NOT_AVAILABLE => C_HEAD,
        _ => C_DIM,
    };
    Cell::new(value).fg(color)
}

fn print_feature_matrix(matrix: &FeatureMatrix) {
    section("features", 64);

    let mut table = new_table();
    let mut header = vec![head("  Feature")];
    header.extend(matrix.tiers.iter().map(|t| head(t)));
    table.set_header(header);

    for row in &matrix.rows {
        let mut cells = vec![Cell::new(format!("  {}", row.feature)).fg(C_NAME)];
        cells.extend(row.values.iter().map(|v| feature_cell(v)));
        table.add_row(cells);
    }
    println!("{table}");
}

// ── Optimal ──────────────────────────────────────────────────────────

fn print_recommendations(recs: &[Recommendation]) {
    section("optimal tier", 48);
    if recs.is_empty() {
        println!("  {}", s_dim().apply_to("pricing table has no tiers"));
        return;
    }

    let mut table = new_table();
    table.set_header(vec![
        head("  Tool calls/mo").set_alignment(CellAlignment::Right),
        head("Tier"),
        head("$/mo").set_alignment(CellAlignment::Right),
    ]);
    for rec in recs {
        table.add_row(vec![
            Cell::new(format!("  {}", fmt_calls(rec.calls)))
                .fg(C_NAME)
                .set_alignment(CellAlignment::Right),
            Cell::new(&rec.tier).fg(C_NAME),
            fmt_cost(rec.cost),
        ]);
    }
    println!("{table}");
}

// ── Quote ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Quote<'a> {
    tier: &'a str,
    calls: u64,
    cost: Cost,
}

fn cmd_quote(table: &PricingTable, name: &str, calls: u64, json: bool) -> anyhow::Result<()> {
    let tier = table
        .find_tier(name)
        .ok_or_else(|| PricingError::TierNotFound(name.to_string()))?;
    let cost = calculator::cost_at_usage(tier, calls);

    if json {
        return print_json(&Quote {
            tier: &tier.name,
            calls,
            cost,
        });
    }

    println!();
    println!(
        "  {}  {}",
        s_header().apply_to(&tier.name),
        s_dim().apply_to(format!("{} calls/mo", fmt_calls(calls)))
    );
    println!("  {}", sep(40));
    match cost {
        Cost::Amount(_) => println!("  {}", s_price().apply_to(format!("{cost}/mo"))),
        Cost::ContactForQuote => println!("  {}", s_price().apply_to(cost)),
    }
    if let Some(note) = quote_breakdown(tier, calls) {
        println!("  {}", s_hint().apply_to(note));
    }
    println!();
    Ok(())
}

/// Base + overage split, for metered tiers that went over their allowance.
fn quote_breakdown(tier: &Tier, calls: u64) -> Option<String> {
    let base = tier.base_price()?;
    let included = tier.included_calls()?;
    let rate = tier.overage_rate()?;
    let over = u64::try_from(i128::from(calls) - i128::from(included))
        .ok()
        .filter(|&n| n > 0)?;
    Some(format!(
        "${base:.2} base + {} calls over allowance at ${rate}/1k",
        fmt_calls(over)
    ))
}

// ── Tiers ────────────────────────────────────────────────────────────

fn print_tiers(table: &PricingTable) {
    section("tiers", 64);
    println!("  {}", s_hint().apply_to(&table.source));

    let mut t = new_table();
    t.set_header(vec![
        head("  Tier"),
        head("$/mo").set_alignment(CellAlignment::Right),
        head("Included calls").set_alignment(CellAlignment::Right),
        head("$/1k over").set_alignment(CellAlignment::Right),
    ]);

    for tier in &table.tiers {
        let price = match &tier.price_monthly {
            Some(MonthlyPrice::Fixed(p)) => fmt_cost(Cost::Amount(*p)),
            Some(MonthlyPrice::Quote(v)) => Cell::new(render_value(v)).fg(C_QUOTE),
            None => fmt_cost(Cost::ContactForQuote),
        };
        let included = match &tier.tool_calls_included {
            Allowance::Calls(n) => Cell::new(fmt_signed_calls(*n)).fg(C_DIM),
            Allowance::Unmetered(v) if v.is_null() => Cell::new("\u{2500}").fg(C_HEAD),
            Allowance::Unmetered(v) => Cell::new(render_value(v)).fg(C_DIM),
        };
        let rate = match tier.overage_rate() {
            Some(r) => Cell::new(format!("${r}")).fg(C_PRICE),
            None => Cell::new("\u{2500}").fg(C_HEAD),
        };
        t.add_row(vec![
            Cell::new(format!("  {}", tier.name)).fg(C_NAME),
            price,
            included.set_alignment(CellAlignment::Right),
            rate.set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{t}");
}
