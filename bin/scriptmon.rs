fn main() {
    scriptmon::scriptmon_main()
}
