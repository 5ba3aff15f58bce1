use crate::tree::MoveTree;

const HEADERS: [(&str, &str); 6] = [
    ("Event", "?"),
    ("Site", "?"),
    ("Date", "????.??.??"),
    ("White", "?"),
    ("Black", "?"),
    ("Result", "*"),
];

/// Render a tree as a single PGN game. The first child of every node is the
/// main line; other children become parenthesized variations. Annotations
/// are written as comments after their move.
pub fn export(tree: &MoveTree) -> String {
    let mut out = String::new();
    for (name, value) in HEADERS {
        out.push_str(&format!("[{name} \"{value}\"]\n"));
    }
    out.push('\n');

    let mut movetext = Movetext::default();
    write_line(tree, tree.root_id(), 0, true, &mut movetext);
    movetext.token("*");
    out.push_str(&movetext.text);
    out.push('\n');
    out
}

#[derive(Default)]
struct Movetext {
    text: String,
}

impl Movetext {
    fn token(&mut self, token: &str) {
        if !self.text.is_empty() && !self.text.ends_with('(') {
            self.text.push(' ');
        }
        self.text.push_str(token);
    }

    fn open(&mut self) {
        self.token("(");
    }

    fn close(&mut self) {
        self.text.push(')');
    }
}

fn write_move(tree: &MoveTree, id: &str, ply: usize, resume: bool, out: &mut Movetext) {
    let Some(node) = tree.node(id) else { return };
    let number = ply / 2 + 1;
    if ply % 2 == 0 {
        out.token(&format!("{number}."));
    } else if resume {
        out.token(&format!("{number}..."));
    }
    out.token(node.move_notation.as_deref().unwrap_or("--"));
    if let Some(annotation) = &node.annotation {
        out.token(&format!("{{{annotation}}}"));
    }
}

enum Step {
    /// Continue the line below `parent`; `ply` is the ply index of its
    /// children.
    Line {
        parent: String,
        ply: usize,
        resume: bool,
    },
    /// Open a variation with its first move.
    Variation { id: String, ply: usize },
    Close,
}

/// Write the main line below `parent` with every variation nested in it.
/// Pending work is kept on an explicit stack rather than the call stack.
fn write_line(tree: &MoveTree, parent: &str, ply: usize, resume: bool, out: &mut Movetext) {
    let mut steps = vec![Step::Line {
        parent: parent.to_string(),
        ply,
        resume,
    }];

    while let Some(step) = steps.pop() {
        match step {
            Step::Line { parent, ply, resume } => {
                let children = tree.children(&parent);
                let Some(main) = children.first() else {
                    continue;
                };
                write_move(tree, main, ply, resume, out);

                steps.push(Step::Line {
                    parent: main.clone(),
                    ply: ply + 1,
                    resume: children.len() > 1,
                });
                for variation in children[1..].iter().rev() {
                    steps.push(Step::Close);
                    steps.push(Step::Line {
                        parent: variation.clone(),
                        ply: ply + 1,
                        resume: false,
                    });
                    steps.push(Step::Variation {
                        id: variation.clone(),
                        ply,
                    });
                }
            }
            Step::Variation { id, ply } => {
                out.open();
                write_move(tree, &id, ply, true, out);
            }
            Step::Close => out.close(),
        }
    }
}
