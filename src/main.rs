use atomera_adapters::{HeadlessViewer, HttpScreeningApi, LibrarySize, ScreeningApi, UploadedFile, Workbench};
use atomera_workbench::config::{init_logging, CONFIG};
use atomera_workbench::presentation::{render_navigation, render_status_bar};
use atomera_workbench::session::{run_session, SessionInput, SessionPlan};
use atomera_workbench::AppError;
use log::{error, info};
use std::sync::Arc;

const USAGE: &str = "uso: atomera [--fasta <ARCHIVO> | --pdb <ARCHIVO>] [--library focused|standard|extended|<N>] \
                     [--remote] [--export <ARCHIVO>]";

/// Secuencia de demostración (lisozima de clara de huevo, 129 residuos).
const DEMO_FASTA: &str = ">sp|P00698|LYSC_CHICK Lysozyme C\n\
                          KVFGRCELAAAMKRHGLDNYRGYSLGNWVCAAKFESNFNTQATNRNTDGSTDYGILQINSRWWCNDGRTPGSRNLCNIPCSALLSSDITASVNCAKKIVSDGNGMNAWVAWRNRCKGTDVQAWIRGCRL";

const DEMO_LIGANDS: [&str; 3] = ["CC(=O)Oc1ccccc1C(=O)O", "CN1C=NC2=C1C(=O)N(C(=O)N2C)C", "CC(C)Cc1ccc(cc1)C(C)C(=O)O"];

struct Args {
    input: SessionInput,
    library: LibrarySize,
    remote: bool,
    export: Option<String>,
}

fn parse_args() -> Result<Args, AppError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut out = Args { input: SessionInput::Fasta(DEMO_FASTA.to_string()),
                         library: LibrarySize::Focused,
                         remote: false,
                         export: None };
    let mut i = 0;
    while i < args.len() {
        let value = |i: usize| args.get(i + 1).cloned().ok_or_else(|| AppError::Usage(USAGE.to_string()));
        match args[i].as_str() {
            "--fasta" => {
                out.input = SessionInput::Fasta(std::fs::read_to_string(value(i)?)?);
                i += 1;
            }
            "--pdb" => {
                let path = value(i)?;
                let bytes = std::fs::read(&path)?;
                let name = std::path::Path::new(&path).file_name()
                                                      .map(|n| n.to_string_lossy().into_owned())
                                                      .unwrap_or(path);
                out.input = SessionInput::File(UploadedFile::new(&name, bytes));
                i += 1;
            }
            "--library" => {
                out.library = value(i)?.parse()?;
                i += 1;
            }
            "--remote" => out.remote = true,
            "--export" => {
                out.export = Some(value(i)?);
                i += 1;
            }
            "-h" | "--help" => return Err(AppError::Usage(USAGE.to_string())),
            other => return Err(AppError::Usage(format!("argumento desconocido '{other}'; {USAGE}"))),
        }
        i += 1;
    }
    args_checked(out)
}

fn args_checked(args: Args) -> Result<Args, AppError> {
    if args.remote && CONFIG.workbench.api_url.is_none() {
        return Err(AppError::Usage("--remote requiere ATOMERA_API_URL".to_string()));
    }
    Ok(args)
}

async fn run() -> Result<(), AppError> {
    let args = parse_args()?;
    let viewer = Arc::new(HeadlessViewer::new());
    let wb = Workbench::new(viewer, CONFIG.workbench.clone());

    // la barra de estado se re-renderiza en cada notificación del store
    wb.store().subscribe(|state| info!("{}", render_status_bar(state, None)));
    wb.enable_picking();

    let api = match (&CONFIG.workbench.api_url, args.remote) {
        (Some(url), true) => Some(HttpScreeningApi::new(url)),
        _ => None,
    };
    let plan = SessionPlan { input: args.input,
                             library: args.library,
                             ligands: DEMO_LIGANDS.iter().map(|s| s.to_string()).collect() };
    let report = run_session(&wb, &plan, api.as_ref().map(|a| a as &dyn ScreeningApi)).await?;

    println!("{}", render_navigation(&wb.store().get_state()));
    println!("{}", render_status_bar(&wb.store().get_state(), wb.active_stage().current_job().as_ref()));
    for (rank, hit) in report.hits.iter().take(5).enumerate() {
        println!("{:>2}. {:<20} {:>7.2} kcal/mol  {}", rank + 1, hit.name, hit.score, hit.confidence);
    }
    if let Some(path) = args.export {
        std::fs::write(&path, serde_json::to_string_pretty(&report.export)?)?;
        info!("session exported to {}", path);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(e) = run().await {
        error!("{}", e);
        eprintln!("{e}");
        std::process::exit(1);
    }
}
