pub const NEUROBOT_SYSTEM: &str = include_str!("../data/prompts/neurobot_system.txt");
