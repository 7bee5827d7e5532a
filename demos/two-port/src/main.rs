use std::{env, process, time::Duration};

use log::{error, info};
use rcinit::{BusPlan, Orchestrator};

mod board;

use board::{SimBoard, WindowCheck};

/// `device-id` (default) or `base-address`.
const ENV_LOOKUP: &str = "RCINIT_LOOKUP";
/// `up` (default) or `down`.
const ENV_RP1_LINK: &str = "RCINIT_RP1_LINK";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let by_address = env::var(ENV_LOOKUP).is_ok_and(|v| v == "base-address");
    let rp1_train = match env::var(ENV_RP1_LINK).as_deref() {
        Ok("down") => None,
        _ => Some(Duration::ZERO),
    };

    // RP0 comes up on the third poll.
    let board = SimBoard::new([Some(Duration::from_millis(180)), rp1_train]);

    let plan = match BusPlan::with_identifiers(
        board.identifier(0, by_address),
        board.identifier(1, by_address),
    ) {
        Ok(plan) => plan,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    info!("=== XDMA/QDMA PCIe TWO-ROOT-PORT ENUMERATION ===");
    let mut enumerator = WindowCheck;
    let status = Orchestrator::new(&board, &mut enumerator, plan).run_to_exit();
    process::exit(status.code());
}
