// Copyright 2026 TwoCookingMice

use millefeuille::io::material_loader::load_material_library;
use millefeuille::validation::furnace::{run_furnace_suite, FurnaceReport, FurnaceSettings};

use console::style;
use std::env;

fn print_report(reports: &[FurnaceReport]) {
    println!("{:<24} {:>6} {:>10} {:>10} {:>10} {:>8}  {}",
             "material", "theta", "albedo", "estimate", "bound", "result", "failures");
    for report in reports {
        let stats = &report.stats;
        let result = if report.passed() {
            style("PASS").green().bold()
        } else {
            style("FAIL").red().bold()
        };
        let failures: Vec<String> = report.failures.iter().map(|f| f.to_string()).collect();
        println!("{:<24} {:>6.1} {:>10.4} {:>10.4} {:>10.4} {:>8}  {}",
                 report.material,
                 report.theta_deg,
                 stats.albedo.max_component(),
                 stats.albedo_estimate.max_component(),
                 report.energy_bound,
                 result,
                 failures.join(","));
    }
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <library.xml> [--samples N] [--seed N]", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let mut settings = FurnaceSettings::default();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--samples" => {
                i += 1;
                settings.samples = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(settings.samples);
            }
            "--seed" => {
                i += 1;
                settings.seed = args.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);
            }
            other => {
                log::warn!("Ignoring unknown argument: {}.", other);
            }
        }
        i += 1;
    }

    let library = match load_material_library(input_path) {
        Ok(library) => library,
        Err(e) => {
            log::error!("Failed to load {}: {}.", input_path, e);
            std::process::exit(1);
        }
    };
    if library.is_empty() {
        log::warn!("{} holds no materials.", input_path);
    }

    let reports = run_furnace_suite(&library, &settings);
    print_report(&reports);

    let failed = reports.iter().filter(|r| !r.passed()).count();
    if failed > 0 {
        println!("{}", style(format!("{} of {} cases failed.", failed, reports.len())).red());
        std::process::exit(1);
    }
    println!("{}", style(format!("All {} cases passed.", reports.len())).green());
}
