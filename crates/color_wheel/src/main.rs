fn main() {
    color_wheel::run();
}
