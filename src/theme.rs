// Theme Configuration - static styling data read by the front-end build
// Mirrors the Tailwind config: content globs, the "float away" animation and plugins

use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize)]
pub struct ThemeConfig {
    pub content: &'static [&'static str],
    pub animations: &'static [Animation],
    pub keyframes: &'static [Keyframes],
    pub plugins: &'static [&'static str],
}

/// Named shorthand for the CSS `animation` property
#[derive(Debug, Serialize)]
pub struct Animation {
    pub name: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Keyframes {
    pub name: &'static str,
    pub stops: &'static [KeyframeStop],
}

#[derive(Debug, Serialize)]
pub struct KeyframeStop {
    /// Position in the animation, 0..=100
    pub percent: u8,
    pub declarations: &'static [Declaration],
}

#[derive(Debug, Serialize)]
pub struct Declaration {
    pub property: &'static str,
    pub value: &'static str,
}

const fn decl(property: &'static str, value: &'static str) -> Declaration {
    Declaration { property, value }
}

pub static THEME: ThemeConfig = ThemeConfig {
    content: &["./src/**/*.{js,ts,jsx,tsx}"],
    animations: &[Animation {
        name: "float",
        value: "float 2s linear forwards",
    }],
    keyframes: &[Keyframes {
        name: "float",
        stops: &[
            KeyframeStop {
                percent: 0,
                declarations: &[
                    decl("opacity", "1"),
                    decl("top", "-15px"),
                    decl("transform", "rotateZ(0deg)"),
                ],
            },
            KeyframeStop {
                percent: 12,
                declarations: &[decl("transform", "rotateZ(-20deg) scale(0.9)")],
            },
            KeyframeStop {
                percent: 24,
                declarations: &[
                    decl("transform", "rotateZ(20deg) scale(0.7)"),
                    decl("left", "3px"),
                    decl("opacity", "0.7"),
                ],
            },
            KeyframeStop {
                percent: 40,
                declarations: &[
                    decl("transform", "rotateZ(-11deg) scale(0.6)"),
                    decl("left", "-3px"),
                ],
            },
            KeyframeStop {
                percent: 70,
                declarations: &[
                    decl("transform", "rotateZ(10deg) scale(0.4)"),
                    decl("left", "3px"),
                    decl("opacity", "0.5"),
                ],
            },
            KeyframeStop {
                percent: 90,
                declarations: &[decl("transform", "scale(0.2)"), decl("left", "-3px")],
            },
            KeyframeStop {
                percent: 100,
                declarations: &[
                    decl("opacity", "0"),
                    decl("top", "-120px"),
                    decl("transform", "rotateZ(-5deg) scale(0.1)"),
                ],
            },
        ],
    }],
    plugins: &["@tailwindcss/typography", "daisyui"],
};

impl ThemeConfig {
    /// Every keyframe block plus an `.animate-<name>` utility class per animation
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ThemeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for keyframes in self.keyframes {
            writeln!(f, "@keyframes {} {{", keyframes.name)?;
            for stop in keyframes.stops {
                writeln!(f, "  {}% {{", stop.percent)?;
                for declaration in stop.declarations {
                    writeln!(f, "    {}: {};", declaration.property, declaration.value)?;
                }
                writeln!(f, "  }}")?;
            }
            writeln!(f, "}}\n")?;
        }

        for animation in self.animations {
            writeln!(
                f,
                ".animate-{} {{\n  animation: {};\n}}\n",
                animation.name, animation.value
            )?;
        }

        Ok(())
    }
}
