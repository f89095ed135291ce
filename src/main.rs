use clap::{App, Arg};
use dimple::{parse, Error, Model, Solver};
use std::fs::File;

fn main() {
    env_logger::init();

    let matches = App::new("dimple")
        .about("A simple SAT solver")
        .arg(
            Arg::with_name("FILE")
                .help("file to solve")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("all")
                .short("a")
                .long("all")
                .help("print all solutions"),
        )
        .arg(
            Arg::with_name("print-cnf")
                .long("print-cnf")
                .help("print the formula in conjunctive normal form before solving"),
        )
        .get_matches();

    let path = matches.value_of("FILE").expect("FILE is required");
    let mut solver = match load(path, matches.is_present("print-cnf")) {
        Ok(solver) => solver,
        Err(e) => {
            eprintln!("Error reading input: {}", e);
            std::process::exit(127);
        }
    };

    let solutions = if matches.is_present("all") {
        solver.solve_all()
    } else {
        solver.solve().map(|model| vec![model])
    };

    let exit_code = match solutions {
        Some(models) => {
            println!("SAT");
            for model in &models {
                print_model(model);
                if matches.is_present("all") {
                    println!("---");
                }
            }
            0
        }
        None => {
            println!("NO SAT");
            1
        }
    };
    std::process::exit(exit_code);
}

fn load(path: &str, print_cnf: bool) -> Result<Solver, Error> {
    let file = File::open(path).map_err(dimple::ParseError::from)?;
    let cnf = parse(file)?.to_cnf();
    if print_cnf {
        println!("{}", cnf);
    }
    Ok(Solver::new(&cnf)?)
}

fn print_model(model: &Model) {
    for (name, value) in model {
        println!("{}: {}", name, value);
    }
}
