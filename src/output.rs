//! User-facing console lines, separate from the tracing log stream.
//! Colors are enabled only when stdout is a TTY.

use owo_colors::OwoColorize;

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {msg}", "info:".cyan().bold());
    } else {
        println!("info: {msg}");
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {msg}", "warn:".yellow().bold());
    } else {
        eprintln!("warn: {msg}");
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {msg}", "error:".red().bold());
    } else {
        eprintln!("error: {msg}");
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {msg}", "ok:".green().bold());
    } else {
        println!("ok: {msg}");
    }
}
