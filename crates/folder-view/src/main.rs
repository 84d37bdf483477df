#![forbid(unsafe_code)]

fn main() {
    std::process::exit(folder_view::run());
}
