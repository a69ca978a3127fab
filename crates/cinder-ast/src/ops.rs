//! Operators as they appear on unary, binary and assignment nodes.

/// Operator of a prefix, postfix, binary or assignment expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    // arithmetic and bitwise
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    // logical
    LAnd,
    LOr,
    Not,
    // comparison
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    // assignment
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
    // unary
    Inc,
    Dec,
    Ref,
    MutRef,
    Deref,
}

impl Op {
    pub fn is_assign(self) -> bool {
        matches!(
            self,
            Op::Assign
                | Op::AddAssign
                | Op::SubAssign
                | Op::MulAssign
                | Op::DivAssign
                | Op::ModAssign
                | Op::AndAssign
                | Op::OrAssign
                | Op::XorAssign
                | Op::ShlAssign
                | Op::ShrAssign
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, Op::Eq | Op::NotEq | Op::Lt | Op::Gt | Op::LtEq | Op::GtEq)
    }

    /// The underlying operation of a compound assignment, e.g. `+=` → `+`.
    pub fn without_assign(self) -> Op {
        match self {
            Op::AddAssign => Op::Add,
            Op::SubAssign => Op::Sub,
            Op::MulAssign => Op::Mul,
            Op::DivAssign => Op::Div,
            Op::ModAssign => Op::Mod,
            Op::AndAssign => Op::And,
            Op::OrAssign => Op::Or,
            Op::XorAssign => Op::Xor,
            Op::ShlAssign => Op::Shl,
            Op::ShrAssign => Op::Shr,
            other => other,
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Mod => "%",
            Op::And => "&",
            Op::Or => "|",
            Op::Xor => "^",
            Op::Shl => "<<",
            Op::Shr => ">>",
            Op::LAnd => "&&",
            Op::LOr => "||",
            Op::Not => "!",
            Op::Eq => "==",
            Op::NotEq => "!=",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::LtEq => "<=",
            Op::GtEq => ">=",
            Op::Assign => "=",
            Op::AddAssign => "+=",
            Op::SubAssign => "-=",
            Op::MulAssign => "*=",
            Op::DivAssign => "/=",
            Op::ModAssign => "%=",
            Op::AndAssign => "&=",
            Op::OrAssign => "|=",
            Op::XorAssign => "^=",
            Op::ShlAssign => "<<=",
            Op::ShrAssign => ">>=",
            Op::Inc => "++",
            Op::Dec => "--",
            Op::Ref => "&",
            Op::MutRef => "mut&",
            Op::Deref => "*",
        };
        f.write_str(s)
    }
}
