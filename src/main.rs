use particle_field::{FieldWindow, Launch};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let launch = match Launch::from_args(&args) {
        Ok(launch) => launch,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("usage: particle-field [plane|sphere|box|torus|torus-knot] [--settings FILE] [--config FILE]");
            std::process::exit(2);
        }
    };

    log::info!("starting with {} geometry", launch.geometry);
    println!("Keys: 1-5 switch geometry, C clears, Esc quits");

    if let Err(e) = FieldWindow::run(launch) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
