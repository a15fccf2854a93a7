//! Textual reader for the IR object model.
//!
//! The catalog usually runs embedded in a host compiler that hands over a
//! [`Module`] in memory. The standalone binary instead reads this
//! S-expression form, which a host can dump cheaply:
//!
//! ```text
//! (module "sim"
//!   (global "gsum" double)
//!   (global "grid" (array 2 (array 3 float)))
//!   (declare "sqrt")
//!   (function "main" (file "sim.c")
//!     (param "eps" double)
//!     (block "entry"
//!       (alloca "acc" double (id "main_0"))
//!       (fadd (id "main_1") (loc "sim.c" 14))
//!       (call "sqrt" (id "main_2"))
//!       (ret))))
//! ```
//!
//! Types are `float`, `double`, `x86_fp80`, `ppc_fp128`, `void`, `(int N)`,
//! `(ptr T)`, `(array N T)`, `(struct "name")`, and `(opaque "text")`.
//! Unrecognized instruction heads parse as opaque opcodes so a host can dump
//! complete function bodies; `(id "...")` and `(loc "file" LINE)` attach to
//! any instruction. `;` starts a line comment.

use std::fmt;

use crate::ir::{Block, Function, Instruction, Module, Opcode, Type};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    Symbol(String),
    Str(String),
    Integer(u64),
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Symbol(s) => write!(f, "{}", s),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::Integer(n) => write!(f, "{}", n),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

/// Hand-written lexer for the textual module form.
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == ';' {
                while let Some(ch) = self.advance() {
                    if ch == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self) -> Result<String, String> {
        let line = self.line;
        let mut result = String::new();
        self.advance(); // consume opening quote

        while let Some(ch) = self.current() {
            if ch == '"' {
                self.advance();
                return Ok(result);
            } else if ch == '\\' {
                self.advance();
                match self.current() {
                    Some('n') => result.push('\n'),
                    Some('t') => result.push('\t'),
                    Some('\\') => result.push('\\'),
                    Some('"') => result.push('"'),
                    Some(c) => result.push(c),
                    None => return Err(format!("Unexpected end of string at line {}", line)),
                }
                self.advance();
            } else {
                result.push(ch);
                self.advance();
            }
        }
        Err(format!("Unclosed string literal at line {}", line))
    }

    fn read_integer(&mut self) -> Result<u64, String> {
        let line = self.line;
        let mut digits = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        digits
            .parse()
            .map_err(|_| format!("Invalid integer '{}' at line {}", digits, line))
    }

    fn read_symbol(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current() {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    pub fn next_token(&mut self) -> Result<Token, String> {
        self.skip_whitespace_and_comments();

        match self.current() {
            None => Ok(Token::Eof),
            Some('(') => {
                self.advance();
                Ok(Token::LParen)
            }
            Some(')') => {
                self.advance();
                Ok(Token::RParen)
            }
            Some('"') => Ok(Token::Str(self.read_string()?)),
            Some(ch) if ch.is_ascii_digit() => Ok(Token::Integer(self.read_integer()?)),
            Some(ch) if ch.is_alphanumeric() || ch == '_' => Ok(Token::Symbol(self.read_symbol())),
            Some(ch) => Err(format!(
                "Unexpected character '{}' at line {}:{}",
                ch, self.line, self.column
            )),
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

/// Recursive-descent parser building the [`Module`] directly.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn expect_lparen(&mut self) -> Result<(), String> {
        match self.current() {
            Token::LParen => {
                self.advance();
                Ok(())
            }
            other => Err(format!("Expected '(', found {}", other)),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), String> {
        match self.current() {
            Token::RParen => {
                self.advance();
                Ok(())
            }
            other => Err(format!("Expected ')', found {}", other)),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), String> {
        match self.current() {
            Token::Symbol(s) if s == keyword => {
                self.advance();
                Ok(())
            }
            other => Err(format!("Expected '{}', found {}", keyword, other)),
        }
    }

    fn take_symbol(&mut self) -> Result<String, String> {
        match self.current() {
            Token::Symbol(s) => {
                let sym = s.clone();
                self.advance();
                Ok(sym)
            }
            other => Err(format!("Expected a symbol, found {}", other)),
        }
    }

    fn take_string(&mut self) -> Result<String, String> {
        match self.current() {
            Token::Str(s) => {
                let text = s.clone();
                self.advance();
                Ok(text)
            }
            other => Err(format!("Expected a string, found {}", other)),
        }
    }

    fn take_integer(&mut self) -> Result<u64, String> {
        match self.current() {
            Token::Integer(n) => {
                let value = *n;
                self.advance();
                Ok(value)
            }
            other => Err(format!("Expected an integer, found {}", other)),
        }
    }

    /// Parse the single `(module ...)` form the token stream must contain.
    pub fn parse_module(&mut self) -> Result<Module, String> {
        self.expect_lparen()?;
        self.expect_keyword("module")?;
        let mut module = Module::new(self.take_string()?);

        while self.current() == &Token::LParen {
            self.advance();
            match self.take_symbol()?.as_str() {
                "global" => {
                    let name = self.take_string()?;
                    let ty = self.parse_type()?;
                    self.expect_rparen()?;
                    module.push_global(name, ty);
                }
                "declare" => {
                    let name = self.take_string()?;
                    self.expect_rparen()?;
                    module.push_function(Function::declaration(name));
                }
                "function" => {
                    module.push_function(self.parse_function()?);
                }
                other => return Err(format!("Unknown module item '{}'", other)),
            }
        }

        self.expect_rparen()?;
        match self.current() {
            Token::Eof => Ok(module),
            other => Err(format!("Trailing input after module: {}", other)),
        }
    }

    /// `"name"` and then any mix of `(file ...)`, `(param ...)`, `(block ...)`
    /// up to the closing paren. The declared source file, when given, is
    /// attached to the entry terminator's debug location if that instruction
    /// carries none of its own.
    fn parse_function(&mut self) -> Result<Function, String> {
        let mut function = Function::definition(self.take_string()?);
        let mut declared_file = None;

        while self.current() == &Token::LParen {
            self.advance();
            match self.take_symbol()?.as_str() {
                "file" => {
                    declared_file = Some(self.take_string()?);
                    self.expect_rparen()?;
                }
                "param" => {
                    let name = self.take_string()?;
                    let ty = self.parse_type()?;
                    self.expect_rparen()?;
                    function.push_param(name, ty);
                }
                "block" => {
                    let block = self.parse_block()?;
                    function.push_block(block);
                }
                other => return Err(format!("Unknown function item '{}'", other)),
            }
        }
        self.expect_rparen()?;

        if let Some(file) = declared_file {
            if let Some(block) = function.blocks.first_mut() {
                if let Some(inst) = block.instructions.last_mut() {
                    if inst.opcode.is_terminator() && inst.debug_loc.is_none() {
                        *inst = inst.clone().with_debug_loc(file, 0);
                    }
                }
            }
        }

        Ok(function)
    }

    fn parse_block(&mut self) -> Result<Block, String> {
        let mut block = Block::new(self.take_string()?);
        while self.current() == &Token::LParen {
            block.push(self.parse_instruction()?);
        }
        self.expect_rparen()?;
        Ok(block)
    }

    fn parse_instruction(&mut self) -> Result<Instruction, String> {
        self.expect_lparen()?;
        let head = self.take_symbol()?;

        let opcode = match head.as_str() {
            "alloca" => {
                let name = self.take_string()?;
                let allocated = self.parse_type()?;
                Opcode::Alloca { name, allocated }
            }
            "fadd" => Opcode::FAdd,
            "fsub" => Opcode::FSub,
            "fmul" => Opcode::FMul,
            "fdiv" => Opcode::FDiv,
            "fcmp" => Opcode::FCmp,
            "call" => {
                // A direct call names its target; a computed call site has
                // no string operand.
                let callee = match self.current() {
                    Token::Str(_) => Some(self.take_string()?),
                    _ => None,
                };
                Opcode::Call { callee }
            }
            "ret" => Opcode::Ret,
            "br" => Opcode::Br,
            other => Opcode::Other(other.to_string()),
        };

        let mut inst = Instruction::new(opcode);
        while self.current() == &Token::LParen {
            self.advance();
            match self.take_symbol()?.as_str() {
                "id" => {
                    let id = self.take_string()?;
                    inst = inst.with_id(id);
                }
                "loc" => {
                    let file = self.take_string()?;
                    let line = self.take_integer()?;
                    inst = inst.with_debug_loc(file, line as u32);
                }
                other => return Err(format!("Unknown instruction attachment '{}'", other)),
            }
            self.expect_rparen()?;
        }
        self.expect_rparen()?;
        Ok(inst)
    }

    fn parse_type(&mut self) -> Result<Type, String> {
        match self.current().clone() {
            Token::Symbol(sym) => {
                self.advance();
                match sym.as_str() {
                    "float" => Ok(Type::Float),
                    "double" => Ok(Type::Double),
                    "x86_fp80" => Ok(Type::X86Fp80),
                    "ppc_fp128" => Ok(Type::PpcFp128),
                    "void" => Ok(Type::Void),
                    other => Err(format!("Unknown type '{}'", other)),
                }
            }
            Token::LParen => {
                self.advance();
                let ty = match self.take_symbol()?.as_str() {
                    "int" => Type::Int(self.take_integer()? as u32),
                    "ptr" => Type::pointer_to(self.parse_type()?),
                    "array" => {
                        let len = self.take_integer()?;
                        Type::array_of(len, self.parse_type()?)
                    }
                    "struct" => Type::Struct(self.take_string()?),
                    "opaque" => Type::Other(self.take_string()?),
                    other => return Err(format!("Unknown type constructor '{}'", other)),
                };
                self.expect_rparen()?;
                Ok(ty)
            }
            other => Err(format!("Expected a type, found {}", other)),
        }
    }
}

/// Parse a complete textual module.
pub fn parse_module(source: &str) -> Result<Module, String> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize()?;
    let mut parser = Parser::new(tokens);
    parser.parse_module()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_basic() {
        let mut lexer = Lexer::new("(module \"m\")");
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LParen,
                Token::Symbol("module".to_string()),
                Token::Str("m".to_string()),
                Token::RParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_comments_and_integers() {
        let mut lexer = Lexer::new("; header comment\n(array 42)");
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LParen,
                Token::Symbol("array".to_string()),
                Token::Integer(42),
                Token::RParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_unclosed_string() {
        let mut lexer = Lexer::new("(global \"gsum");
        assert!(lexer.tokenize().is_err());
    }

    #[test]
    fn test_parse_empty_module() {
        let module = parse_module("(module \"empty\")").unwrap();
        assert_eq!(module.name, "empty");
        assert!(module.globals.is_empty());
        assert!(module.functions.is_empty());
    }

    #[test]
    fn test_parse_globals_and_types() {
        let module = parse_module(
            r#"(module "m"
                 (global "gsum" double)
                 (global "grid" (array 2 (array 3 float)))
                 (global "buf" (ptr double))
                 (global "flags" (int 32))
                 (global "state" (struct "sim_state")))"#,
        )
        .unwrap();

        assert_eq!(module.globals.len(), 5);
        assert_eq!(module.globals[0].ty, Type::Double);
        assert_eq!(
            module.globals[1].ty,
            Type::array_of(2, Type::array_of(3, Type::Float))
        );
        assert_eq!(module.globals[2].ty, Type::pointer_to(Type::Double));
        assert_eq!(module.globals[3].ty, Type::Int(32));
        assert_eq!(module.globals[4].ty, Type::Struct("sim_state".to_string()));
    }

    #[test]
    fn test_parse_function_body() {
        let module = parse_module(
            r#"(module "m"
                 (declare "sqrt")
                 (function "main" (file "sim.c")
                   (param "eps" double)
                   (block "entry"
                     (alloca "acc" double (id "main_0"))
                     (fadd (id "main_1") (loc "sim.c" 14))
                     (call "sqrt" (id "main_2"))
                     (ret))))"#,
        )
        .unwrap();

        assert!(module.function("sqrt").unwrap().is_declaration);

        let main = module.function("main").unwrap();
        assert!(!main.is_declaration);
        assert_eq!(main.params.len(), 1);

        let entry = main.entry_block().unwrap();
        assert_eq!(entry.instructions.len(), 4);
        assert_eq!(entry.instructions[1].stable_id(), Some("main_1"));
        assert_eq!(
            entry.instructions[1].debug_loc.as_ref().unwrap().line,
            14
        );

        // The declared file lands on the entry terminator.
        let term = entry.terminator().unwrap();
        assert_eq!(term.debug_loc.as_ref().unwrap().file, "sim.c");
    }

    #[test]
    fn test_declared_file_keeps_existing_loc() {
        let module = parse_module(
            r#"(module "m"
                 (function "main" (file "wrapper.c")
                   (block "entry"
                     (ret (loc "sim.c" 9)))))"#,
        )
        .unwrap();
        let term = module.function("main").unwrap().entry_block().unwrap().terminator().unwrap();
        assert_eq!(term.debug_loc.as_ref().unwrap().file, "sim.c");
    }

    #[test]
    fn test_indirect_call() {
        let module = parse_module(
            r#"(module "m"
                 (function "main"
                   (block "entry"
                     (call (id "main_0"))
                     (ret))))"#,
        )
        .unwrap();
        let entry = module.function("main").unwrap().entry_block().unwrap();
        assert_eq!(entry.instructions[0].opcode, Opcode::Call { callee: None });
    }

    #[test]
    fn test_unmodeled_opcode_parses_as_other() {
        let module = parse_module(
            r#"(module "m"
                 (function "main"
                   (block "entry"
                     (load (id "main_0"))
                     (ret))))"#,
        )
        .unwrap();
        let entry = module.function("main").unwrap().entry_block().unwrap();
        assert_eq!(
            entry.instructions[0].opcode,
            Opcode::Other("load".to_string())
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_module("(module \"m\"").is_err());
        assert!(parse_module("(module \"m\" (global \"g\" quadruple))").is_err());
        assert!(parse_module("(module \"m\") trailing").is_err());
        assert!(parse_module("(program \"m\")").is_err());
    }
}
