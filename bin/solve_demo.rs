//! Worked example: solve a 3x3 system with two right-hand sides.
//!
//! Prints the system before the call, then the packed L/U factors, the
//! pivot vector and the solution after it. Takes no arguments. A
//! singular system maps to a non-zero process exit code.

use dense_solvers::{Matrix, SolveError, lu_solve_in_place};
use std::process::ExitCode;

fn print_matrix(label: &str, m: &Matrix<f64>) {
    println!("{label} ({}x{}, {:?}):", m.nrows(), m.ncols(), m.layout());
    for i in 0..m.nrows() {
        for j in 0..m.ncols() {
            print!(" {:10.4}", m.get(i, j));
        }
        println!();
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let mut a = Matrix::from_rows(vec![
        vec![1.0, 3.0, 0.0],
        vec![2.0, 4.0, -4.0],
        vec![-1.0, 9.0, 8.0],
    ])
    .expect("static matrix data is well-formed");
    let mut b = Matrix::from_rows(vec![vec![1.0, 9.0], vec![2.0, 3.0], vec![9.0, 1.0]])
        .expect("static matrix data is well-formed");

    println!("Solving A . X = B");
    print_matrix("A", &a);
    print_matrix("B", &b);

    match lu_solve_in_place(&mut a, &mut b) {
        Ok(pivots) => {
            println!("status: 0 (success)");
            println!("pivot vector: {:?}", pivots.as_slice());
            print_matrix("packed L/U factors (in A)", &a);
            print_matrix("solution X (in B)", &b);
            ExitCode::SUCCESS
        }
        Err(SolveError::Singular { pivot }) => {
            println!("status: {pivot} (singular)");
            println!("no unique solution: zero pivot at elimination step {pivot}");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}
