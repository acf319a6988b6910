mod app;
mod bridge;
mod pages;
mod shell;
mod widgets;

fn main() {
    leptos::mount_to_body(app::App);
}
