fn main() {
    build::create_build_info();
}
