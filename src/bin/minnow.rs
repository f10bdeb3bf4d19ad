use std::io::{BufRead, Write, stdin, stdout};

use miette::{IntoDiagnostic, Result, miette};

use minnow_db::{Database, Table, Value};

const SNAPSHOT_PATH: &str = "./minnow.dat";

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(false)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();

    let mut db = Database::new();

    for query in [
        "CREATE TABLE users ({autoincrement} id : int32, {unique} login: string[32], password_hash: bytes[8], is_admin: bool = false)",
        "INSERT INTO users VALUES ('Alice' 0x123abc true)",
        "INSERT INTO users VALUES ('Bob' 0x789abc)",
    ] {
        println!("Running: {query}");
        db.execute(query)?;
    }

    println!("Table 'users' after inserts:");
    print_table(db.get_table("users")?);

    println!("Saving database to {SNAPSHOT_PATH}...");
    db.save_to_file(SNAPSHOT_PATH)?;

    let mut db = Database::new();
    println!("Loading database from {SNAPSHOT_PATH}...");
    db.load_from_file(SNAPSHOT_PATH)?;

    println!("Table 'users' after load:");
    print_table(db.get_table("users")?);

    let mut buf = String::new();

    let mut stdin = stdin().lock();
    let mut stdout = stdout().lock();

    loop {
        stdout.write_all(b"DB: ").into_diagnostic()?;
        stdout.flush().into_diagnostic()?;

        buf.clear();
        let Ok(read) = stdin.read_line(&mut buf) else {
            return Err(miette!("Input reading failed"));
        };

        let input = buf.trim();
        if read == 0 || input == "exit" {
            break;
        }
        if input.is_empty() {
            continue;
        }

        match db.execute(input) {
            Ok(response) => {
                if response.columns.is_empty() {
                    println!("OK");
                    continue;
                }
                for name in &response.columns {
                    print!("{name: <15}");
                }
                println!();
                println!("{}", "-".repeat(response.columns.len() * 15));
                for row in &response.rows {
                    for name in &response.columns {
                        match row.get_value(name) {
                            Ok(value) => print!("{: <15}", display_cell(value)),
                            Err(_) => print!("{: <15}", ""),
                        }
                    }
                    println!();
                }
            }
            Err(err) => println!("{err}"),
        }
    }

    println!("Exiting minnow");

    Ok(())
}

fn display_cell(value: &Value) -> String {
    match value {
        Value::Bytes(_) => "[BLOB]".to_string(),
        value => value.to_string(),
    }
}

fn print_table(table: &Table) {
    if table.columns().is_empty() {
        println!("The table is empty.");
        return;
    }

    for column in table.columns() {
        print!("{: <15}", column.name);
    }
    println!();
    println!("{}", "-".repeat(table.columns().len() * 15));

    for row in table.rows() {
        for column in table.columns() {
            match row.get_value(&column.name) {
                Ok(value) => print!("{: <15}", display_cell(value)),
                Err(_) => print!("{: <15}", ""),
            }
        }
        println!();
    }
}
