error_chain! {
    foreign_links {
        Io(::std::io::Error);
        ParseFloat(::std::num::ParseFloatError);
        ParseInt(::std::num::ParseIntError);
    }
    errors {
        InvalidGeometry(reason: String) {
            description("invalid geometry")
            display("invalid geometry: {}", reason)
        }
        MissingJoint(name: String) {
            description("unknown joint in keyframe table")
            display("keyframe table references unknown joint: {}", name)
        }
    }
}
