//! 订单号校验
//!
//! 订单号必须是纯 ASCII 数字并通过 Luhn 模 10 校验。
//! 有意不使用 `\d`：部分正则实现会把其他文字系统的数字字形也算进去。

/// 是否为非空纯数字串
pub fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Luhn 模 10 校验
///
/// 调用方保证传入纯数字串；包含其他字符时返回 false。
pub fn is_valid(number: &str) -> bool {
    if !is_digits(number) {
        return false;
    }

    let sum: u32 = number
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();

    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_valid_numbers() {
        // 经典测试号段与真实卡号结构
        assert!(is_valid("12345678903"));
        assert!(is_valid("2377225624"));
        assert!(is_valid("4561261212345467"));
        assert!(is_valid("79927398713"));
        assert!(is_valid("0"));
    }

    #[test]
    fn test_known_invalid_numbers() {
        assert!(!is_valid("1234"));
        assert!(!is_valid("12345678901"));
        assert!(!is_valid("79927398710"));
    }

    #[test]
    fn test_rejects_non_digits() {
        assert!(!is_valid(""));
        assert!(!is_valid("1234a678"));
        assert!(!is_valid("12 34"));
        assert!(!is_valid("-12345678903"));
        // utf-8 数字字形不是 ASCII 数字
        assert!(!is_valid("١٢٣٤"));
    }

    #[test]
    fn test_is_digits() {
        assert!(is_digits("0123456789"));
        assert!(!is_digits(""));
        assert!(!is_digits("12.3"));
    }
}
