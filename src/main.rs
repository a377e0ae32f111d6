// Entry point and high-level CLI flow.
//
// - The store logs in first; nothing is read before the password matches.
// - Option [1] loads and normalizes the sales and stock reports.
// - Option [2] prints the KPIs and tables and writes the action plan files.
// - After generating reports, the user can go back to the menu or exit.
// With `--batch` the load and generate steps run once without the menu.
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use stock_report::auth::{self, Session};
use stock_report::config::{ReportSettings, StoreDirectory};
use stock_report::types::{BlockedRow, SalesRecord, StockRecord};
use stock_report::{loader, logging, output, pipeline, util, ReportError, ReportResult};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "stock-report", about = "Store stock health & replenishment planner")]
struct Args {
    /// Sales report (.xlsx, .xls, .ods or .csv)
    #[arg(long)]
    sales: Option<PathBuf>,

    /// Stock report (.xlsx, .xls, .ods or .csv)
    #[arg(long)]
    stock: Option<PathBuf>,

    /// Store directory with passwords and optional report overrides
    #[arg(long, default_value = "stores.toml")]
    stores: PathBuf,

    /// Store code; picked from a list when absent
    #[arg(long)]
    store: Option<String>,

    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Best sellers shown (10 to 50, in steps of 10)
    #[arg(long, default_value_t = 20)]
    top: usize,

    /// Only show these merch groups in the replenishment table
    #[arg(long = "merch-group")]
    merch_groups: Vec<String>,

    /// Also export every table as CSV
    #[arg(long, default_value_t = false)]
    csv: bool,

    /// Load and generate once, without the menu
    #[arg(long, default_value_t = false)]
    batch: bool,
}

// Everything a logged-in run needs, owned by `main` and passed down.
struct AppState {
    session: Session,
    settings: ReportSettings,
    data: Option<(Vec<SalesRecord>, Vec<StockRecord>)>,
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    prompt("Enter choice: ")
}

/// Ask the user whether to go back to the report selection menu after
/// generating reports.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = prompt("Back to Report Selection (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Accepts either the list number or the store code itself.
fn select_store(dir: &StoreDirectory) -> String {
    let codes = dir.store_codes();
    println!("Select Store:");
    for (i, code) in codes.iter().enumerate() {
        println!("[{}] {}", i + 1, code);
    }
    let choice = read_choice();
    choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| codes.get(i))
        .map(|c| c.to_string())
        .unwrap_or(choice)
}

fn login(args: &Args) -> ReportResult<AppState> {
    let dir = StoreDirectory::from_file(&args.stores)?;
    auth::require_stores(&dir)?;
    let store = match &args.store {
        Some(code) => code.clone(),
        None => select_store(&dir),
    };
    let password = match std::env::var("STORE_PASSWORD") {
        Ok(p) => p,
        Err(_) => prompt("Password: "),
    };
    let session = auth::authenticate(&dir, &store, &password)?;
    println!("Logged in as {}\n", session.store_code);
    Ok(AppState { session, settings: dir.report, data: None })
}

fn path_or_prompt(path: &Option<PathBuf>, label: &str) -> PathBuf {
    match path {
        Some(p) => p.clone(),
        None => PathBuf::from(prompt(label)),
    }
}

/// Handle option [1]: load and normalize both reports.
fn handle_load(state: &mut AppState, args: &Args) -> ReportResult<()> {
    let sales_path = path_or_prompt(&args.sales, "Sales report path: ");
    let stock_path = path_or_prompt(&args.stock, "Stock report path: ");
    let (sales, stock, load_report) = loader::load_reports(&sales_path, &stock_path)?;
    println!(
        "Processing reports... ({} sales rows, {} stock rows loaded)\n",
        util::format_int(load_report.sales_rows),
        util::format_int(load_report.stock_rows)
    );
    state.data = Some((sales, stock));
    Ok(())
}

/// Best sellers are shown in steps of ten, between 10 and 50.
fn best_seller_limit(top: usize) -> usize {
    (top.clamp(10, 50) + 5) / 10 * 10
}

fn filter_merch_groups(rows: &[BlockedRow], groups: &[String]) -> Vec<BlockedRow> {
    if groups.is_empty() {
        return rows.to_vec();
    }
    let wanted: Vec<String> = groups.iter().map(|g| util::normalize_key(g)).collect();
    rows.iter()
        .filter(|r| wanted.contains(&r.merch_group))
        .cloned()
        .collect()
}

/// Handle option [2]: print every table and write the action plan files.
fn handle_generate_reports(state: &AppState, args: &Args) -> ReportResult<()> {
    let Some((sales, stock)) = state.data.clone() else {
        return Err(ReportError::NotLoaded);
    };

    let run = pipeline::analyze(&state.session, sales, stock, &state.settings);

    println!("Store Stock Health & Replenishment Planner");
    println!("Store: {}\n", state.session.store_code);
    output::print_kpis(&run.kpi);

    println!("Discounted Products per Merch Group\n");
    output::preview_table_rows(&run.reports.discounted, usize::MAX);

    let top = best_seller_limit(args.top);
    println!("Best Sellers (Top {})\n", top);
    output::preview_table_rows(&run.reports.best_sellers, top);

    println!("Immediate Replenishment (Priority by Financial Risk)\n");
    let blocked = filter_merch_groups(&run.reports.replenishment, &args.merch_groups);
    if blocked.is_empty() {
        println!("No fully blocked items\n");
    } else {
        output::preview_table_rows(&blocked, usize::MAX);
    }

    println!("Merch Group Capacity & Feasibility\n");
    output::preview_table_rows(&run.reports.action_plan, usize::MAX);

    let written = pipeline::export(&state.session, &run, &args.out_dir, args.csv)?;
    for path in &written {
        println!("(Exported to {})", path.display());
    }
    println!();
    Ok(())
}

fn run(args: &Args) -> ReportResult<()> {
    let mut state = login(args)?;

    if args.batch {
        handle_load(&mut state, args)?;
        return handle_generate_reports(&state, args);
    }

    loop {
        println!("Select Option:");
        println!("[1] Load the files");
        println!("[2] Generate Reports\n");
        match read_choice().as_str() {
            "1" => {
                // Schema problems are reported and the menu is shown again.
                if let Err(e) = handle_load(&mut state, args) {
                    error!("{}", e);
                    eprintln!("Failed to load files: {}\n", e);
                }
            }
            "2" => {
                println!();
                if let Err(e) = handle_generate_reports(&state, args) {
                    eprintln!("Error: {}\n", e);
                    continue;
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    return Ok(());
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();
    info!(stores = %args.stores.display(), batch = args.batch, "starting");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
