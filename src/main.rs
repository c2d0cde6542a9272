fn main() {
    interview_coach_lib::run()
}
