use rand::seq::SliceRandom;

pub const PLACEHOLDERS: &[&str] = &[
    "Knack your coded parole here, no dulling!",
    "Yarn wetin dey for your mind, no dey fear!",
    "Drop your rugged message, no loose guard!",
    "Offload your coded tinz here, senior man!",
    "Make your parole land here, no slack!",
    "Knack street-level gist, no dey hide am!",
    "Offload your matter here, no yawa!",
    "Abeg, knack wetin dey sup for your side!",
    "Oya yarn your mind, coded and sharp!",
    "Knack beta gist wey make sense!",
    "Make your rugged vibes enter here sharp!",
    "Yarn your coded tinz here, omo street!",
    "Offload your matter here, steady no slack!",
    "Knack strong talk here, coded levels only!",
    "Yarn coded parole, no dey look face!",
];

pub const FOOTER: &str = "Dis bot na for rugged cruise, no use am for gbege or yawa.";

pub fn random_placeholder() -> &'static str {
    PLACEHOLDERS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(PLACEHOLDERS[0])
}
