//! Module for generating random Python expressions for property-based testing.
//!
//! This module defines the `PyExpr` enum which represents a subset of Python expression syntax: names,
//! literals, calls, attribute access, subscripts, displays, arithmetic, comparisons, boolean operators,
//! conditional expressions, lambdas and assignment expressions.
//!
//! `to_code` renders an expression with exactly the parentheses the grammar requires for the tree
//! structure, so the generated code exercises every precedence boundary that the conversion has to
//! respect. Generation functions use a depth parameter to limit recursion.
//!
//! Keywords, soft keywords and names with statement meaning in older grammars are avoided.

use quickcheck::{Arbitrary, Gen};

const MAX_DEPTH: usize = 4;

const RESERVED_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "case", "class", "continue",
    "def", "del", "elif", "else", "except", "exec", "finally", "for", "from", "global", "if", "import", "in",
    "is", "lambda", "match", "nonlocal", "not", "or", "pass", "print", "raise", "return", "try", "type",
    "while", "with", "yield",
];

/// Arithmetic operators, split by binding strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    BitOr,
    Mul,
    Div,
    Mod,
}

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    GtE,
    In,
    NotIn,
    Is,
    IsNot,
}

/// Boolean connectives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

/// A Python expression.
#[derive(Clone, Debug)]
pub enum PyExpr {
    Name(String),
    Int(u32),
    Float(u32, u32),
    Str(String),
    Call { func: Box<PyExpr>, args: Vec<PyExpr> },
    Attribute(Box<PyExpr>, String),
    Subscript(Box<PyExpr>, Box<PyExpr>),
    List(Vec<PyExpr>),
    Tuple(Vec<PyExpr>),
    Paren(Box<PyExpr>),
    Arith(Box<PyExpr>, ArithOp, Box<PyExpr>),
    Neg(Box<PyExpr>),
    Compare(Box<PyExpr>, CmpOp, Box<PyExpr>),
    Not(Box<PyExpr>),
    Bool(Box<PyExpr>, BoolOp, Box<PyExpr>),
    IfElse { body: Box<PyExpr>, test: Box<PyExpr>, orelse: Box<PyExpr> },
    Lambda(Box<PyExpr>),
    Walrus(String, Box<PyExpr>),
}

/// Binding strength of an expression form, weakest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Walrus,
    Lambda,
    IfElse,
    Bool,
    Not,
    Compare,
    Additive,
    Term,
    Unary,
    Atom,
}

impl ArithOp {
    fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::BitOr => "|",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
        }
    }

    fn level(self) -> Level {
        match self {
            ArithOp::Add | ArithOp::Sub | ArithOp::BitOr => Level::Additive,
            ArithOp::Mul | ArithOp::Div | ArithOp::Mod => Level::Term,
        }
    }
}

impl CmpOp {
    fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::GtE => ">=",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
            CmpOp::Is => "is",
            CmpOp::IsNot => "is not",
        }
    }
}

impl Arbitrary for ArithOp {
    fn arbitrary(g: &mut Gen) -> Self {
        const CHOICES: &[ArithOp] =
            &[ArithOp::Add, ArithOp::Sub, ArithOp::BitOr, ArithOp::Mul, ArithOp::Div, ArithOp::Mod];
        *g.choose(CHOICES).unwrap()
    }
}

impl Arbitrary for CmpOp {
    fn arbitrary(g: &mut Gen) -> Self {
        const CHOICES: &[CmpOp] = &[
            CmpOp::Eq, CmpOp::NotEq, CmpOp::Lt, CmpOp::GtE, CmpOp::In, CmpOp::NotIn, CmpOp::Is, CmpOp::IsNot,
        ];
        *g.choose(CHOICES).unwrap()
    }
}

impl Arbitrary for BoolOp {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&[BoolOp::And, BoolOp::Or]).unwrap()
    }
}

impl Arbitrary for PyExpr {
    fn arbitrary(g: &mut Gen) -> Self {
        gen_expr(g, g.size().min(MAX_DEPTH))
    }
}

/// Generates a random number in the range [min, max] inclusive.
fn gen_range(g: &mut Gen, min: u32, max: u32) -> u32 {
    min + (u32::arbitrary(g) % (max - min + 1))
}

/// Generates a random identifier that is not a reserved keyword.
fn gen_var_name(g: &mut Gen) -> String {
    let starters: Vec<char> = "abcdefghijklmnopqrstuvwxyz_".chars().collect();
    let continuers: Vec<char> = "abcdefghijklmnopqrstuvwxyz0123456789_".chars().collect();
    loop {
        let len = gen_range(g, 1, 8);
        let mut name = String::new();
        name.push(*g.choose(&starters).unwrap());
        for _ in 1..len {
            name.push(*g.choose(&continuers).unwrap());
        }
        if !RESERVED_KEYWORDS.iter().any(|&kw| kw == name.as_str()) {
            return name;
        }
    }
}

/// Generates string literal content without quotes, backslashes or line breaks.
fn gen_string_content(g: &mut Gen) -> String {
    let len = gen_range(g, 0, 6);
    let alphabet: Vec<char> = "abcxyz 012_.-:".chars().collect();
    (0..len).map(|_| *g.choose(&alphabet).unwrap()).collect()
}

fn gen_atom(g: &mut Gen) -> PyExpr {
    const CHOICES: &[&str] = &["name", "name", "int", "float", "string"];
    match *g.choose(CHOICES).unwrap() {
        "name" => PyExpr::Name(gen_var_name(g)),
        "int" => PyExpr::Int(gen_range(g, 0, 1000)),
        "float" => PyExpr::Float(gen_range(g, 0, 100), gen_range(g, 0, 99)),
        "string" => PyExpr::Str(gen_string_content(g)),
        _ => unreachable!(),
    }
}

fn gen_list(g: &mut Gen, depth: usize) -> Vec<PyExpr> {
    (0..gen_range(g, 0, 3)).map(|_| gen_expr(g, depth - 1)).collect()
}

fn boxed(g: &mut Gen, depth: usize) -> Box<PyExpr> {
    Box::new(gen_expr(g, depth - 1))
}

/// Generates a random expression with nesting at most `depth`.
pub fn gen_expr(g: &mut Gen, depth: usize) -> PyExpr {
    if depth == 0 {
        return gen_atom(g);
    }
    const CHOICES: &[&str] = &[
        "atom", "atom", "call", "attribute", "subscript", "list", "tuple", "paren", "arith", "arith", "neg",
        "compare", "compare", "not", "bool", "ifelse", "lambda", "walrus",
    ];
    match *g.choose(CHOICES).unwrap() {
        "atom" => gen_atom(g),
        "call" => PyExpr::Call { func: Box::new(PyExpr::Name(gen_var_name(g))), args: gen_list(g, depth) },
        "attribute" => PyExpr::Attribute(boxed(g, depth), gen_var_name(g)),
        "subscript" => PyExpr::Subscript(boxed(g, depth), boxed(g, depth)),
        "list" => PyExpr::List(gen_list(g, depth)),
        "tuple" => {
            let mut items = gen_list(g, depth);
            if items.is_empty() {
                items.push(gen_atom(g));
            }
            PyExpr::Tuple(items)
        }
        "paren" => PyExpr::Paren(boxed(g, depth)),
        "arith" => PyExpr::Arith(boxed(g, depth), ArithOp::arbitrary(g), boxed(g, depth)),
        "neg" => PyExpr::Neg(boxed(g, depth)),
        "compare" => PyExpr::Compare(boxed(g, depth), CmpOp::arbitrary(g), boxed(g, depth)),
        "not" => PyExpr::Not(boxed(g, depth)),
        "bool" => PyExpr::Bool(boxed(g, depth), BoolOp::arbitrary(g), boxed(g, depth)),
        "ifelse" => PyExpr::IfElse { body: boxed(g, depth), test: boxed(g, depth), orelse: boxed(g, depth) },
        "lambda" => PyExpr::Lambda(boxed(g, depth)),
        "walrus" => PyExpr::Walrus(gen_var_name(g), boxed(g, depth)),
        _ => unreachable!(),
    }
}

impl PyExpr {
    fn level(&self) -> Level {
        match self {
            PyExpr::Walrus(..) => Level::Walrus,
            PyExpr::Lambda(_) => Level::Lambda,
            PyExpr::IfElse { .. } => Level::IfElse,
            PyExpr::Bool(..) => Level::Bool,
            PyExpr::Not(_) => Level::Not,
            PyExpr::Compare(..) => Level::Compare,
            PyExpr::Arith(_, op, _) => op.level(),
            PyExpr::Neg(_) => Level::Unary,
            _ => Level::Atom,
        }
    }

    /// Renders the expression as it may appear as a call argument.
    pub fn to_code(&self) -> String {
        self.code_at(Level::Walrus)
    }

    /// Renders the expression, parenthesized if it binds weaker than `min`.
    fn code_at(&self, min: Level) -> String {
        let code = self.bare_code();
        if self.level() < min { format!("({code})") } else { code }
    }

    fn bare_code(&self) -> String {
        match self {
            PyExpr::Name(name) => name.clone(),
            PyExpr::Int(value) => value.to_string(),
            PyExpr::Float(int, frac) => format!("{int}.{frac}"),
            PyExpr::Str(content) => format!("'{content}'"),
            PyExpr::Call { func, args } => {
                let args: Vec<String> = args.iter().map(|arg| arg.code_at(Level::Walrus)).collect();
                format!("{}({})", func.code_at(Level::Atom), args.join(", "))
            }
            PyExpr::Attribute(value, attr) => {
                let value = value.code_at(Level::Atom);
                // `1.x` would lex as a float.
                if value.starts_with(|c: char| c.is_ascii_digit()) {
                    format!("({value}).{attr}")
                } else {
                    format!("{value}.{attr}")
                }
            }
            PyExpr::Subscript(value, index) => {
                format!("{}[{}]", value.code_at(Level::Atom), index.code_at(Level::Lambda))
            }
            PyExpr::List(items) => {
                let items: Vec<String> = items.iter().map(|item| item.code_at(Level::Lambda)).collect();
                format!("[{}]", items.join(", "))
            }
            PyExpr::Tuple(items) => {
                let items: Vec<String> = items.iter().map(|item| item.code_at(Level::Lambda)).collect();
                if items.len() == 1 {
                    format!("({},)", items[0])
                } else {
                    format!("({})", items.join(", "))
                }
            }
            PyExpr::Paren(inner) => format!("({})", inner.code_at(Level::Walrus)),
            PyExpr::Arith(left, op, right) => {
                let level = op.level();
                let right_min = if level == Level::Additive { Level::Term } else { Level::Unary };
                format!("{} {} {}", left.code_at(level), op.symbol(), right.code_at(right_min))
            }
            PyExpr::Neg(operand) => format!("-{}", operand.code_at(Level::Unary)),
            PyExpr::Compare(left, op, right) => {
                format!("{} {} {}", left.code_at(Level::Additive), op.symbol(), right.code_at(Level::Additive))
            }
            PyExpr::Not(operand) => format!("not {}", operand.code_at(Level::Not)),
            PyExpr::Bool(left, op, right) => {
                let op = match op {
                    BoolOp::And => "and",
                    BoolOp::Or => "or",
                };
                format!("{} {} {}", left.code_at(Level::Not), op, right.code_at(Level::Not))
            }
            PyExpr::IfElse { body, test, orelse } => format!(
                "{} if {} else {}",
                body.code_at(Level::Bool),
                test.code_at(Level::Bool),
                orelse.code_at(Level::Bool)
            ),
            PyExpr::Lambda(body) => format!("lambda: {}", body.code_at(Level::Lambda)),
            PyExpr::Walrus(name, value) => format!("{name} := {}", value.code_at(Level::Lambda)),
        }
    }
}
